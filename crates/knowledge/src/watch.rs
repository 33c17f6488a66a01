//! File-watch re-ingestion.
//!
//! Filesystem events under the knowledge base are coalesced per markdown file
//! for a debounce window, then the file is re-ingested (or its points removed
//! when it no longer exists). Runs for the same file are serialized; different
//! files proceed concurrently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use devmind_core::{AppError, AppResult};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::chunk::{self, normalize_relative};
use crate::ingest::Ingestor;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Per-file deadlines; every new event pushes the file's deadline out.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: HashMap<String, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn touch(&mut self, source_file: String, now: Instant) {
        self.pending.insert(source_file, now + self.window);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return files whose window has elapsed, in path order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<String> {
        let mut due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(file, _)| file.clone())
            .collect();
        due.sort();

        for file in &due {
            self.pending.remove(file);
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One async lock per `source_file`.
#[derive(Debug, Default, Clone)]
pub struct FileLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl FileLocks {
    pub async fn lock_for(&self, source_file: &str) -> Arc<Mutex<()>> {
        let mut locks = self.inner.lock().await;
        locks.entry(source_file.to_string()).or_default().clone()
    }
}

/// Watches the knowledge base and keeps the collection in sync.
pub struct KnowledgeWatcher {
    ingestor: Ingestor,
    debounce: Duration,
    locks: FileLocks,
}

impl KnowledgeWatcher {
    pub fn new(ingestor: Ingestor) -> Self {
        Self {
            ingestor,
            debounce: DEFAULT_DEBOUNCE,
            locks: FileLocks::default(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Watch until Ctrl-C, then wait for in-flight runs.
    pub async fn run(&self) -> AppResult<()> {
        let root = self.ingestor.knowledge_base();
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(watch_error)?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(watch_error)?;

        info!(
            "Watching {:?} (debounce {}ms). Press Ctrl-C to stop",
            root,
            self.debounce.as_millis()
        );

        let mut debouncer = Debouncer::new(self.debounce);
        let mut tasks = JoinSet::new();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            let deadline = debouncer.next_deadline();

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping watcher");
                    break;
                }
                event = rx.recv() => match event {
                    Some(Ok(event)) => {
                        for source_file in changed_files(&root, &event) {
                            debug!("Change detected: {}", source_file);
                            debouncer.touch(source_file, Instant::now());
                        }
                    }
                    Some(Err(e)) => warn!("Watch error: {}", e),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    for source_file in debouncer.drain_due(Instant::now()) {
                        let lock = self.locks.lock_for(&source_file).await;
                        let ingestor = self.ingestor.clone();
                        tasks.spawn(async move {
                            let _guard = lock.lock().await;
                            sync_file(&ingestor, &source_file).await;
                        });
                    }
                }
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(watcher);
        while tasks.join_next().await.is_some() {}
        Ok(())
    }
}

/// Re-ingest a file that exists, remove the points of one that does not.
/// Failures are logged; the watcher keeps running.
pub async fn sync_file(ingestor: &Ingestor, source_file: &str) {
    let path = ingestor.knowledge_base().join(source_file);

    if path.is_file() {
        match ingestor.reingest_single_file(source_file).await {
            Ok(report) => info!(
                "Synced {}: {} embedded, {} failed",
                source_file, report.embedded, report.failed
            ),
            Err(e) => error!("Failed to re-ingest {}: {}", source_file, e),
        }
    } else if let Err(e) = ingestor.remove_file(source_file).await {
        error!("Failed to remove {}: {}", source_file, e);
    }
}

/// Markdown files under `root` touched by `event`, as `source_file` keys.
pub fn changed_files(root: &Path, event: &Event) -> Vec<String> {
    if matches!(event.kind, EventKind::Access(_)) {
        return Vec::new();
    }

    let mut files: Vec<String> = event
        .paths
        .iter()
        .filter(|p| chunk::is_markdown(p))
        .filter_map(|p| relative_to(root, p))
        .collect();
    files.dedup();
    files
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    Some(normalize_relative(&relative))
}

fn watch_error(err: notify::Error) -> AppError {
    AppError::Other(format!("File watcher error: {}", err))
}
