//! Ingestion pipeline (write path).
//!
//! Chunks are embedded strictly one at a time. A chunk whose embedding fails is
//! logged, recorded in the report and skipped; store failures abort the run.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use devmind_core::{AppError, AppResult};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::chunk::{self, Chunk};
use crate::embeddings::Embedder;
use crate::store::{Point, VectorStore};

/// Single-file runs start their ids at least this far above the point count.
pub const SINGLE_FILE_ID_OFFSET: u64 = 1000;

/// One chunk that could not be embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestFailure {
    pub source_file: String,
    pub section: String,
    pub error: String,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Chunks produced by the chunker
    pub chunks_total: usize,

    /// Chunks embedded and written
    pub embedded: usize,

    pub failed: usize,
    pub failures: Vec<IngestFailure>,

    /// Points in the collection after the run
    pub points_count: u64,

    /// Written chunks per category
    pub by_category: BTreeMap<String, usize>,

    pub duration_secs: f64,
}

impl IngestReport {
    fn record_failure(&mut self, chunk: &Chunk, error: &AppError) {
        self.failed += 1;
        self.failures.push(IngestFailure {
            source_file: chunk.source_file.clone(),
            section: chunk.section.clone(),
            error: error.to_string(),
        });
    }

    fn record_success(&mut self, chunk: &Chunk) {
        self.embedded += 1;
        *self
            .by_category
            .entry(chunk.category.as_str().to_string())
            .or_insert(0) += 1;
    }
}

/// Writes the knowledge base into the vector store.
///
/// Clones share one write lock. Id allocation and the writes that use those
/// ids happen under it, so concurrent runs never hand out the same ids.
#[derive(Clone)]
pub struct Ingestor {
    knowledge_base: PathBuf,
    embedder: Embedder,
    store: Arc<dyn VectorStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Ingestor {
    pub fn new(
        knowledge_base: impl Into<PathBuf>,
        embedder: Embedder,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            knowledge_base: knowledge_base.into(),
            embedder,
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn knowledge_base(&self) -> &Path {
        &self.knowledge_base
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Drop the collection and rebuild it from every markdown file.
    ///
    /// Point ids are `1..=n` over the full chunk list; failed chunks leave gaps.
    #[instrument(skip(self), fields(root = %self.knowledge_base.display()))]
    pub async fn full_reingest(&self) -> AppResult<IngestReport> {
        let start = Instant::now();
        info!("Starting full re-ingestion");

        let _guard = self.write_lock.lock().await;

        self.store.delete_collection().await?;
        self.store.ensure_collection().await?;

        let chunks = chunk::chunk_knowledge_base(&self.knowledge_base)?;
        let mut report = IngestReport {
            chunks_total: chunks.len(),
            ..Default::default()
        };

        let points = self.embed_chunks(chunks, &mut report).await;
        self.write_points(points, 1).await?;

        report.points_count = self.points_count().await?;
        report.duration_secs = start.elapsed().as_secs_f64();

        info!(
            "Full re-ingestion completed: {} embedded, {} failed, {} points in {:.2}s",
            report.embedded, report.failed, report.points_count, report.duration_secs
        );

        Ok(report)
    }

    /// Replace the points of one file, given relative to the knowledge base.
    ///
    /// Stale points are deleted even when the file now yields no chunks. New
    /// ids start above both the point count plus [`SINGLE_FILE_ID_OFFSET`] and
    /// the highest id in use.
    #[instrument(skip(self))]
    pub async fn reingest_single_file(&self, relative_path: &str) -> AppResult<IngestReport> {
        let start = Instant::now();
        let source_file = normalize_source_file(relative_path)?;
        let path = self.knowledge_base.join(&source_file);

        if !path.is_file() {
            return Err(AppError::Chunking(format!(
                "File not found in knowledge base: {}",
                source_file
            )));
        }
        if !chunk::is_markdown(&path) {
            return Err(AppError::Validation(format!(
                "Not a markdown file: {}",
                source_file
            )));
        }

        let chunks = chunk::chunk_file(&self.knowledge_base, &path)?;
        debug!("{}: {} chunks", source_file, chunks.len());

        let mut report = IngestReport {
            chunks_total: chunks.len(),
            ..Default::default()
        };
        let points = self.embed_chunks(chunks, &mut report).await;

        let guard = self.write_lock.lock().await;

        self.store.ensure_collection().await?;
        self.store.delete_by_file(&source_file).await?;

        let points_count = self.points_count().await?;
        let base_id = id_band_start(points_count, self.store.max_point_id().await?);
        self.write_points(points, base_id).await?;

        report.points_count = self.points_count().await?;
        drop(guard);
        report.duration_secs = start.elapsed().as_secs_f64();

        info!(
            "Re-ingested {}: {} embedded, {} failed (ids from {})",
            source_file, report.embedded, report.failed, base_id
        );

        Ok(report)
    }

    /// Delete every point of one file. A collection that was never created
    /// has nothing to delete.
    #[instrument(skip(self))]
    pub async fn remove_file(&self, relative_path: &str) -> AppResult<()> {
        let source_file = normalize_source_file(relative_path)?;
        match self.store.delete_by_file(&source_file).await {
            Ok(()) => {
                info!("Removed points for {}", source_file);
                Ok(())
            }
            Err(AppError::CollectionNotFound(name)) => {
                debug!("Collection '{}' missing, nothing to remove", name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Embed chunks in order. Ids are offsets into `chunks` until
    /// [`Self::write_points`] moves them into a band.
    async fn embed_chunks(&self, chunks: Vec<Chunk>, report: &mut IngestReport) -> Vec<Point> {
        let total = chunks.len();
        let mut points = Vec::with_capacity(total);

        for (i, chunk) in chunks.into_iter().enumerate() {
            match self.embedder.embed(&chunk.content).await {
                Ok(vector) => {
                    report.record_success(&chunk);
                    points.push(Point {
                        id: i as u64,
                        vector,
                        payload: chunk,
                    });
                }
                Err(e) => {
                    warn!(
                        "Failed to embed {} [{}]: {}",
                        chunk.source_file, chunk.section, e
                    );
                    report.record_failure(&chunk, &e);
                }
            }

            if (i + 1) % 25 == 0 {
                debug!("Embedded {}/{} chunks", i + 1, total);
            }
        }

        points
    }

    async fn write_points(&self, mut points: Vec<Point>, base_id: u64) -> AppResult<()> {
        if points.is_empty() {
            return Ok(());
        }
        for point in &mut points {
            point.id += base_id;
        }
        self.store.upsert_points(&points).await
    }

    async fn points_count(&self) -> AppResult<u64> {
        Ok(self
            .store
            .collection_info()
            .await?
            .map(|info| info.points_count)
            .unwrap_or(0))
    }
}

/// First id of a single-file band.
pub fn id_band_start(points_count: u64, max_point_id: Option<u64>) -> u64 {
    let offset = points_count + SINGLE_FILE_ID_OFFSET;
    match max_point_id {
        Some(max) => offset.max(max + 1),
        None => offset,
    }
}

/// Canonical `source_file` key for a user-supplied relative path.
///
/// Backslashes become `/` and leading `./` is dropped. Absolute paths and
/// `..` segments are rejected.
pub fn normalize_source_file(relative_path: &str) -> AppResult<String> {
    let unified = relative_path.trim().replace('\\', "/");
    let path = Path::new(&unified);

    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(AppError::Validation(format!(
                    "Path must be relative to the knowledge base: {}",
                    relative_path
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(AppError::Validation("Path must not be empty".to_string()));
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_source_file() {
        assert_eq!(normalize_source_file("rules/a.md").unwrap(), "rules/a.md");
        assert_eq!(normalize_source_file("./rules/a.md").unwrap(), "rules/a.md");
        assert_eq!(normalize_source_file("rules\\sub\\a.md").unwrap(), "rules/sub/a.md");
        assert_eq!(normalize_source_file(" memory/x.md ").unwrap(), "memory/x.md");
    }

    #[test]
    fn test_normalize_rejects_escapes() {
        assert!(matches!(
            normalize_source_file("../secrets.md"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            normalize_source_file("/etc/passwd"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(normalize_source_file("  "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_id_band_start() {
        assert_eq!(id_band_start(0, None), 1000);
        assert_eq!(id_band_start(10, Some(10)), 1010);
        // second file re-ingested right after a first one at 1010..1012
        assert_eq!(id_band_start(13, Some(1012)), 1013);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let mut report = IngestReport {
            chunks_total: 1,
            ..Default::default()
        };
        report.failed = 1;
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["chunksTotal"], 1);
        assert_eq!(value["failed"], 1);
        assert!(value["byCategory"].is_object());
    }
}
