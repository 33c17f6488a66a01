//! Memory command handler.
//!
//! Appends a conversation summary to the memory document and re-ingests it.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::{save_memory, Engine, MemorySummary};

use super::{print_json, print_report};

/// Save a conversation summary into the knowledge base
#[derive(Args, Debug)]
pub struct MemoryCommand {
    /// Task the summary belongs to
    #[arg(long)]
    pub task: String,

    /// Summary points (repeat for several)
    #[arg(long, required = true, num_args = 1..)]
    pub summary: Vec<String>,

    /// Tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl MemoryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing memory command");
        config.validate_knowledge_base()?;

        let engine = Engine::from_config(config)?;
        let summary = MemorySummary::from(self.summary.clone());
        let report = save_memory(engine.ingestor(), &self.task, &summary, &self.tags).await?;

        if self.json {
            print_json(&serde_json::json!({
                "status": "ok",
                "task": self.task,
                "summary": summary.points(),
                "tags": self.tags,
                "report": report,
            }))?;
        } else {
            println!("Memory saved and ingested for: \"{}\"", self.task);
            print_report(&report);
        }

        Ok(())
    }
}
