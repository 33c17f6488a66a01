//! Command handlers for the devmind CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod context;
pub mod ingest;
pub mod memory;
pub mod query;
pub mod reset;
pub mod rules;
pub mod status;

// Re-export command types for convenience
pub use context::ContextCommand;
pub use ingest::{IngestCommand, SyncCommand};
pub use memory::MemoryCommand;
pub use query::QueryCommand;
pub use reset::ResetCommand;
pub use rules::RulesCommand;
pub use status::StatusCommand;

use devmind_core::AppResult;
use devmind_knowledge::{Chunk, IngestReport};
use serde::Serialize;

/// Pretty-print any serializable value to stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_report(report: &IngestReport) {
    println!(
        "Embedded {}/{} chunks ({} failed) in {:.2}s, {} points in collection",
        report.embedded, report.chunks_total, report.failed, report.duration_secs, report.points_count
    );

    if !report.by_category.is_empty() {
        let categories: Vec<String> = report
            .by_category
            .iter()
            .map(|(category, count)| format!("{}: {}", category, count))
            .collect();
        println!("By category: {}", categories.join(", "));
    }

    for failure in &report.failures {
        println!(
            "  failed: {} [{}]: {}",
            failure.source_file, failure.section, failure.error
        );
    }
}

/// One-line header for a chunk listing.
pub(crate) fn chunk_header(chunk: &Chunk) -> String {
    let tags = if chunk.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", chunk.tags.join(", "))
    };
    format!(
        "{} > {} ({}, {}){}",
        chunk.source_file, chunk.section, chunk.category, chunk.priority, tags
    )
}
