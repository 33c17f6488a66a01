//! Vector store abstraction.
//!
//! A store owns one named collection of fixed dimensionality with cosine
//! distance. Implementations:
//! - [`QdrantStore`]: Qdrant over gRPC
//! - [`InMemoryStore`]: brute-force store for tests and offline use

pub mod filter;
pub mod memory;
pub mod qdrant;

pub use filter::{Condition, Filter, PayloadField};
pub use memory::InMemoryStore;
pub use qdrant::QdrantStore;

use async_trait::async_trait;
use devmind_core::AppResult;
use serde::Serialize;

use crate::chunk::{Category, Chunk, Priority};

/// Writes are sent in batches of this many points.
pub const UPSERT_BATCH_SIZE: usize = 50;

/// Results scoring below this are dropped by the store.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.3;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_SCROLL_LIMIT: usize = 100;
pub const DEFAULT_FILE_SCROLL_LIMIT: usize = 50;

/// Collection statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub name: String,
    pub vector_size: usize,
    pub points_count: u64,
    pub status: String,
}

/// The persisted unit: id, vector and chunk payload.
#[derive(Debug, Clone)]
pub struct Point {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Chunk,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub id: u64,
    pub score: f32,
    pub chunk: Chunk,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    /// Any-of match
    pub tags: Vec<String>,
    pub score_threshold: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            category: None,
            priority: None,
            tags: Vec::new(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn filter(&self) -> Filter {
        Filter::from_parts(self.category, self.priority, &self.tags)
    }
}

#[derive(Debug, Clone)]
pub struct ScrollOptions {
    pub limit: usize,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SCROLL_LIMIT,
            category: None,
            priority: None,
        }
    }
}

impl ScrollOptions {
    pub fn filter(&self) -> Filter {
        Filter::from_parts(self.category, self.priority, &[])
    }
}

/// What `ensure_collection` has to do given the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAction {
    /// Exists with the configured dimensionality
    Keep,
    /// Exists with another dimensionality: delete, then create
    Recreate { existing: usize },
    /// Absent
    Create,
}

pub fn plan_collection(existing: Option<usize>, configured: usize) -> CollectionAction {
    match existing {
        Some(size) if size == configured => CollectionAction::Keep,
        Some(size) => CollectionAction::Recreate { existing: size },
        None => CollectionAction::Create,
    }
}

/// Trait for vector store backends.
///
/// Errors are returned per call; an unreachable store never panics.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Collection name
    fn collection(&self) -> &str;

    /// Configured dimensionality
    fn vector_size(&self) -> usize;

    /// Create the collection if needed, recreating it on a dimensionality mismatch.
    async fn ensure_collection(&self) -> AppResult<CollectionInfo>;

    /// `None` when the collection does not exist.
    async fn collection_info(&self) -> AppResult<Option<CollectionInfo>>;

    /// Insert or replace points by id, in batches of [`UPSERT_BATCH_SIZE`].
    async fn upsert_points(&self, points: &[Point]) -> AppResult<()>;

    /// Nearest neighbours by cosine similarity, best first.
    async fn search(&self, vector: &[f32], options: &SearchOptions)
        -> AppResult<Vec<ScoredChunk>>;

    /// Filter-only retrieval, in id order.
    async fn scroll_all(&self, options: &ScrollOptions) -> AppResult<Vec<Chunk>>;

    /// All chunks of one source file (up to `limit`), in id order.
    async fn scroll_by_file(&self, source_file: &str, limit: usize) -> AppResult<Vec<Chunk>>;

    /// Highest point id in the collection, `None` when it is empty.
    async fn max_point_id(&self) -> AppResult<Option<u64>>;

    /// Delete every point whose `source_file` matches.
    async fn delete_by_file(&self, source_file: &str) -> AppResult<()>;

    /// Drop the whole collection. Missing collections are not an error.
    async fn delete_collection(&self) -> AppResult<()>;
}

/// Cosine similarity; 0.0 for mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_collection() {
        assert_eq!(plan_collection(Some(768), 768), CollectionAction::Keep);
        assert_eq!(
            plan_collection(Some(512), 768),
            CollectionAction::Recreate { existing: 512 }
        );
        assert_eq!(plan_collection(None, 768), CollectionAction::Create);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_option_defaults() {
        let search = SearchOptions::default();
        assert_eq!(search.limit, 5);
        assert!((search.score_threshold - 0.3).abs() < f32::EPSILON);
        assert!(search.filter().is_empty());

        let scroll = ScrollOptions::default();
        assert_eq!(scroll.limit, 100);
    }
}
