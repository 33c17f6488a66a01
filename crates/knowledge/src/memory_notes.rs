//! Conversation-summary notes.
//!
//! Notes are appended as `##` sections to a markdown document inside the
//! knowledge base, which is then re-ingested so the note is searchable.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use devmind_core::{AppError, AppResult};
use serde::Deserialize;
use tracing::info;

use crate::ingest::{IngestReport, Ingestor};

/// Memory document, relative to the knowledge base.
pub const MEMORY_DOCUMENT: &str = "memory/conversation-summaries.md";

const MEMORY_TITLE: &str = "# Conversation Summaries";

/// A summary given as one string or as a list of points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MemorySummary {
    Single(String),
    List(Vec<String>),
}

impl MemorySummary {
    /// Non-empty, trimmed bullet points.
    pub fn points(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            MemorySummary::Single(text) => vec![text.as_str()],
            MemorySummary::List(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

impl From<&str> for MemorySummary {
    fn from(text: &str) -> Self {
        MemorySummary::Single(text.to_string())
    }
}

impl From<String> for MemorySummary {
    fn from(text: String) -> Self {
        MemorySummary::Single(text)
    }
}

impl From<Vec<String>> for MemorySummary {
    fn from(items: Vec<String>) -> Self {
        match items.len() {
            1 => MemorySummary::Single(items.into_iter().next().unwrap_or_default()),
            _ => MemorySummary::List(items),
        }
    }
}

/// Append a note for `task` and re-ingest the memory document.
pub async fn save_memory(
    ingestor: &Ingestor,
    task: &str,
    summary: &MemorySummary,
    tags: &[String],
) -> AppResult<IngestReport> {
    let entry = format_entry(task, summary, tags, Utc::now())?;
    append_entry(ingestor.knowledge_base(), &entry)?;
    info!("Saved memory note for task: {}", task.trim());

    ingestor.reingest_single_file(MEMORY_DOCUMENT).await
}

/// Render one `##` note.
pub fn format_entry(
    task: &str,
    summary: &MemorySummary,
    tags: &[String],
    saved_at: DateTime<Utc>,
) -> AppResult<String> {
    let title = task.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(AppError::Validation("Task must not be empty".to_string()));
    }

    let points = summary.points();
    if points.is_empty() {
        return Err(AppError::Validation("Summary must not be empty".to_string()));
    }

    let tags: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let tags_line = if tags.is_empty() {
        "none".to_string()
    } else {
        tags.join(", ")
    };

    let mut entry = format!(
        "## {}\n\n**Date:** {}\n**Tags:** {}\n\n",
        title,
        saved_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        tags_line
    );
    for point in points {
        entry.push_str("- ");
        entry.push_str(&point);
        entry.push('\n');
    }

    Ok(entry)
}

fn append_entry(knowledge_base: &Path, entry: &str) -> AppResult<()> {
    let path = knowledge_base.join(MEMORY_DOCUMENT);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let is_new = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    if is_new {
        writeln!(file, "{}", MEMORY_TITLE)?;
    }
    write!(file, "\n{}", entry)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_format_entry_list() {
        let summary = MemorySummary::List(vec!["used MVVM".into(), "  ".into(), "added Zod schema".into()]);
        let entry = format_entry(
            "build   login page",
            &summary,
            &["auth".to_string(), "frontend".to_string()],
            fixed_time(),
        )
        .unwrap();

        assert_eq!(
            entry,
            "## build login page\n\n**Date:** 2025-03-04T10:30:00Z\n**Tags:** auth, frontend\n\n- used MVVM\n- added Zod schema\n"
        );
    }

    #[test]
    fn test_format_entry_single_without_tags() {
        let entry = format_entry("fix hover", &"patched tooltip".into(), &[], fixed_time()).unwrap();
        assert!(entry.contains("**Tags:** none"));
        assert!(entry.ends_with("- patched tooltip\n"));
    }

    #[test]
    fn test_empty_task_or_summary_rejected() {
        assert!(matches!(
            format_entry("  ", &"x".into(), &[], fixed_time()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            format_entry("task", &MemorySummary::List(vec![]), &[], fixed_time()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_summary_deserializes_both_shapes() {
        let single: MemorySummary = serde_json::from_str("\"one\"").unwrap();
        assert_eq!(single, MemorySummary::Single("one".into()));
        let list: MemorySummary = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(list.points(), vec!["a", "b"]);
    }

    #[test]
    fn test_append_creates_title_once() {
        let dir = TempDir::new().unwrap();
        append_entry(dir.path(), "## one\n").unwrap();
        append_entry(dir.path(), "## two\n").unwrap();

        let content = fs::read_to_string(dir.path().join(MEMORY_DOCUMENT)).unwrap();
        assert_eq!(content.matches(MEMORY_TITLE).count(), 1);
        assert!(content.starts_with(MEMORY_TITLE));
        assert!(content.find("## one").unwrap() < content.find("## two").unwrap());
    }
}
