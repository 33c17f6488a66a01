//! Markdown chunking with metadata tagging.
//!
//! This module turns the knowledge base into section-level chunks:
//! - Enumerates every `.md` file under the root (sorted, recursive)
//! - Splits each file on `## ` headings (see [`splitter`])
//! - Attaches category, tags, priority and provenance metadata (see [`metadata`])

pub mod metadata;
pub mod splitter;

pub use splitter::{split_sections, Section, MIN_BODY_CHARS};

use chrono::{DateTime, Utc};
use devmind_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// A section-level unit of knowledge-base text.
///
/// Serialized field names double as the vector-store payload keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Full text including the synthesized `# title` / `## section` header
    pub content: String,

    /// Path relative to the knowledge-base root, `/`-separated
    pub source_file: String,

    pub section: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub priority: Priority,

    /// 1-based line where the section starts
    pub line_start: usize,

    /// Size of the whole source file in bytes
    pub file_size: u64,

    pub last_modified: DateTime<Utc>,
    pub char_count: usize,

    /// SHA-256 of `content`
    #[serde(default)]
    pub content_hash: String,
}

/// Coarse document classification, from the top-level folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rule,
    Workflow,
    Template,
    Memory,
}

/// Urgency tier inferred from mandatory-language keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Normal,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rule => "rule",
            Category::Workflow => "workflow",
            Category::Template => "template",
            Category::Memory => "memory",
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Normal => "normal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rule" => Ok(Category::Rule),
            "workflow" => Ok(Category::Workflow),
            "template" => Ok(Category::Template),
            "memory" => Ok(Category::Memory),
            other => Err(AppError::Validation(format!(
                "Unknown category '{}'. Expected one of: rule, workflow, template, memory",
                other
            ))),
        }
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "normal" => Ok(Priority::Normal),
            other => Err(AppError::Validation(format!(
                "Unknown priority '{}'. Expected one of: critical, high, medium, normal",
                other
            ))),
        }
    }
}

/// Chunk every markdown file under `root`.
///
/// Files are visited in sorted path order so repeated runs produce the same
/// sequence. An unreadable file aborts the whole pass.
pub fn chunk_knowledge_base(root: &Path) -> AppResult<Vec<Chunk>> {
    if !root.is_dir() {
        return Err(AppError::Chunking(format!(
            "Knowledge base root is not a directory: {:?}",
            root
        )));
    }

    let files = markdown_files(root)?;
    let mut chunks = Vec::new();

    for path in &files {
        let file_chunks = chunk_file(root, path)?;
        tracing::debug!("{:?}: {} chunks", path, file_chunks.len());
        chunks.extend(file_chunks);
    }

    tracing::info!(
        "Chunked into {} sections across {} files",
        chunks.len(),
        files.len()
    );

    Ok(chunks)
}

/// Chunk a single file located under `root`.
pub fn chunk_file(root: &Path, path: &Path) -> AppResult<Vec<Chunk>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Chunking(format!("Failed to read {:?}: {}", path, e)))?;
    let meta = std::fs::metadata(path)
        .map_err(|e| AppError::Chunking(format!("Failed to stat {:?}: {}", path, e)))?;

    let relative = path.strip_prefix(root).map_err(|_| {
        AppError::Chunking(format!("{:?} is outside the knowledge base {:?}", path, root))
    })?;
    let source_file = normalize_relative(relative);
    let category = metadata::detect_category(relative);
    let last_modified: DateTime<Utc> = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let default_title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let chunks = split_sections(&content, default_title)
        .into_iter()
        .map(|section| {
            let tags = metadata::detect_tags(&section.content);
            let priority = metadata::detect_priority(&section.content, category);
            Chunk {
                char_count: section.content.chars().count(),
                content_hash: metadata::calculate_hash(&section.content),
                content: section.content,
                source_file: source_file.clone(),
                section: section.section,
                category,
                tags,
                priority,
                line_start: section.line_start,
                file_size: meta.len(),
                last_modified,
            }
        })
        .collect();

    Ok(chunks)
}

/// `/`-separated form of a relative path, used as the stable `source_file` key.
pub fn normalize_relative(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn markdown_files(root: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry
            .map_err(|e| AppError::Chunking(format!("Failed to walk {:?}: {}", root, e)))?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
