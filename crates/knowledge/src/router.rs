//! Context routing: deterministic document loads, semantic search, dedup and formatting.
//!
//! For a task string the router
//! 1. loads the identity document in full,
//! 2. loads the documents of every keyword detector that fires, in table order,
//! 3. runs an unfiltered semantic search for the task,
//! 4. drops semantic hits from files already loaded in steps 1-2,
//! 5. renders deterministic blocks first and semantic hits last.
//!
//! Short greeting-like tasks short-circuit to an empty context.

use std::collections::HashSet;
use std::sync::Arc;

use devmind_core::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::chunk::{Chunk, Priority};
use crate::embeddings::Embedder;
use crate::store::{ScoredChunk, SearchOptions, VectorStore, DEFAULT_FILE_SCROLL_LIMIT};

/// Block label of the identity document.
pub const IDENTITY_LABEL: &str = "Senior Dev";

pub const DEFAULT_ROUTE_LIMIT: usize = 5;

/// (label, pattern, documents) in evaluation order.
const DEFAULT_DETECTORS: &[(&str, &str, &[&str])] = &[
    (
        "MVP",
        r"(?i)\bmvp\b|init-mvp|minimum viable product",
        &["rules/mvp-workflows.md"],
    ),
    (
        "Debug",
        r"(?i)\b(debug|error|fix|bug|issue|fail|broken|hover)\b",
        &["rules/trace-logs-explain-fix.md", "rules/troubleshooting.md"],
    ),
    (
        "Create",
        r"(?i)\b(create|build|add|make|scaffold|implement)\b",
        &["rules/create-feature.md"],
    ),
    (
        "Admin Package",
        r"(?i)\b(admin|package|npm|library)\b",
        &["npm-packages/admin-ui-1.md"],
    ),
];

static DETECTORS: Lazy<Vec<Detector>> = Lazy::new(|| {
    DEFAULT_DETECTORS
        .iter()
        .map(|(label, pattern, documents)| {
            Detector::new(label, pattern, documents).expect("Failed to compile detector regex")
        })
        .collect()
});

static CASUAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(hi|hello|hey|hola|yo|good morning|good afternoon|good evening|how are you|test|ping)(\s|$|[.!?])",
    )
    .expect("Failed to compile casual-chat regex")
});

/// Keyword trigger that force-loads a set of documents.
#[derive(Debug, Clone)]
pub struct Detector {
    pub label: String,
    pub pattern: Regex,
    /// Knowledge-base relative paths
    pub documents: Vec<String>,
}

impl Detector {
    pub fn new(label: &str, pattern: &str, documents: &[&str]) -> AppResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid detector pattern for '{}': {}", label, e))
        })?;
        Ok(Self {
            label: label.to_string(),
            pattern,
            documents: documents.iter().map(|d| d.to_string()).collect(),
        })
    }

    pub fn matches(&self, task: &str) -> bool {
        self.pattern.is_match(task)
    }
}

/// The built-in detector table.
pub fn default_detectors() -> Vec<Detector> {
    DETECTORS.clone()
}

/// Greeting-like input of at most three words.
pub fn is_casual(task: &str) -> bool {
    let trimmed = task.trim();
    trimmed.split_whitespace().count() <= 3 && CASUAL_REGEX.is_match(trimmed)
}

/// Chunks force-loaded by one detector (or the identity document).
#[derive(Debug, Clone, Serialize)]
pub struct DeterministicBlock {
    pub label: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub block: String,
    pub file: String,
    pub section: String,
    pub priority: Priority,
    /// Present for semantic results only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub tags: Vec<String>,
}

/// One entry per chunk in the merged context, in the same order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceManifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub task: String,
    pub casual: bool,
    pub deterministic: Vec<DeterministicBlock>,
    pub semantic: Vec<ScoredChunk>,
    pub merged_context: String,
    pub manifest: SourceManifest,
    pub total_rules_applied: usize,
}

impl RouteResult {
    fn casual(task: &str) -> Self {
        Self {
            task: task.to_string(),
            casual: true,
            deterministic: Vec::new(),
            semantic: Vec::new(),
            merged_context: String::new(),
            manifest: SourceManifest::default(),
            total_rules_applied: 0,
        }
    }
}

/// Assembles prompt context from deterministic and semantic sources.
pub struct ContextRouter {
    store: Arc<dyn VectorStore>,
    embedder: Embedder,
    identity_document: String,
    detectors: Vec<Detector>,
}

impl ContextRouter {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Embedder, identity_document: &str) -> Self {
        Self {
            store,
            embedder,
            identity_document: identity_document.to_string(),
            detectors: default_detectors(),
        }
    }

    /// Build the context bundle for `task` with up to `limit` semantic results.
    pub async fn route(&self, task: &str, limit: usize) -> AppResult<RouteResult> {
        let task = task.trim();
        if task.is_empty() {
            return Err(AppError::Validation("task must not be empty".to_string()));
        }

        if is_casual(task) {
            tracing::debug!("Casual task, skipping retrieval: {:?}", task);
            return Ok(RouteResult::casual(task));
        }

        let mut loaded: HashSet<String> = HashSet::new();
        let mut deterministic = Vec::new();

        loaded.insert(self.identity_document.clone());
        let identity = self
            .store
            .scroll_by_file(&self.identity_document, DEFAULT_FILE_SCROLL_LIMIT)
            .await?;
        deterministic.push(DeterministicBlock {
            label: IDENTITY_LABEL.to_string(),
            chunks: identity,
        });

        for detector in self.detectors.iter().filter(|d| d.matches(task)) {
            let mut chunks = Vec::new();
            for document in &detector.documents {
                // A document triggered twice is loaded by the first detector only
                if !loaded.insert(document.clone()) {
                    continue;
                }
                chunks.extend(
                    self.store
                        .scroll_by_file(document, DEFAULT_FILE_SCROLL_LIMIT)
                        .await?,
                );
            }
            tracing::debug!("Detector '{}' fired: {} chunks", detector.label, chunks.len());
            deterministic.push(DeterministicBlock {
                label: detector.label.clone(),
                chunks,
            });
        }

        let mut semantic = if limit == 0 {
            Vec::new()
        } else {
            let vector = self.embedder.embed(task).await?;
            self.store
                .search(&vector, &SearchOptions::with_limit(limit))
                .await?
        };

        let before = semantic.len();
        semantic.retain(|hit| !loaded.contains(&hit.chunk.source_file));
        if semantic.len() < before {
            tracing::debug!(
                "Dropped {} semantic results already loaded deterministically",
                before - semantic.len()
            );
        }

        let merged_context = format_context(&deterministic, &semantic);
        let manifest = build_manifest(&deterministic, &semantic);
        let total_rules_applied = manifest.entries.len();

        tracing::info!(
            "Routed task: {} deterministic blocks, {} semantic results, {} rules",
            deterministic.len(),
            semantic.len(),
            total_rules_applied
        );

        Ok(RouteResult {
            task: task.to_string(),
            casual: false,
            deterministic,
            semantic,
            merged_context,
            manifest,
            total_rules_applied,
        })
    }
}

fn source_line(chunk: &Chunk) -> String {
    format!(
        "[Source: {} | Section: {} | Priority: {}]",
        chunk.source_file, chunk.section, chunk.priority
    )
}

/// Percentage shown next to semantic results.
pub fn match_percent(score: f32) -> i64 {
    (score * 100.0).round() as i64
}

/// Deterministic blocks (numbered per block), then semantic hits, blank-line separated.
pub fn format_context(deterministic: &[DeterministicBlock], semantic: &[ScoredChunk]) -> String {
    let mut blocks = Vec::new();

    for block in deterministic {
        for (i, chunk) in block.chunks.iter().enumerate() {
            blocks.push(format!(
                "=== {} Rule {} ===\n{}\n{}",
                block.label,
                i + 1,
                source_line(chunk),
                chunk.content
            ));
        }
    }

    for (i, hit) in semantic.iter().enumerate() {
        blocks.push(format!(
            "--- Task Rule {} ({}% match) ---\n{}\n{}",
            i + 1,
            match_percent(hit.score),
            source_line(&hit.chunk),
            hit.chunk.content
        ));
    }

    blocks.join("\n\n")
}

fn build_manifest(deterministic: &[DeterministicBlock], semantic: &[ScoredChunk]) -> SourceManifest {
    let mut entries = Vec::new();

    for block in deterministic {
        entries.extend(block.chunks.iter().map(|chunk| ManifestEntry {
            block: block.label.clone(),
            file: chunk.source_file.clone(),
            section: chunk.section.clone(),
            priority: chunk.priority,
            score: None,
            tags: chunk.tags.clone(),
        }));
    }

    entries.extend(semantic.iter().map(|hit| ManifestEntry {
        block: "Task".to_string(),
        file: hit.chunk.source_file.clone(),
        section: hit.chunk.section.clone(),
        priority: hit.chunk.priority,
        score: Some(hit.score),
        tags: hit.chunk.tags.clone(),
    }));

    SourceManifest { entries }
}
