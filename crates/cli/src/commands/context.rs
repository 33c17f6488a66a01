//! Context command handler.
//!
//! Prints the merged prompt context the router assembles for a task.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::router::DEFAULT_ROUTE_LIMIT;
use devmind_knowledge::Engine;

use super::print_json;

/// Build prompt context for a task
#[derive(Args, Debug)]
pub struct ContextCommand {
    /// Task description
    pub task: String,

    /// Maximum number of semantic results
    #[arg(short, long, default_value_t = DEFAULT_ROUTE_LIMIT)]
    pub limit: usize,

    /// Output as JSON (context plus source manifest)
    #[arg(long)]
    pub json: bool,
}

impl ContextCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing context command");

        let engine = Engine::from_config(config)?;
        let result = engine.router().route(&self.task, self.limit).await?;

        if self.json {
            return print_json(&serde_json::json!({
                "task": result.task,
                "casual": result.casual,
                "mergedContext": result.merged_context,
                "sourceManifest": result.manifest,
                "totalRulesApplied": result.total_rules_applied,
            }));
        }

        if result.casual {
            println!("(casual input, no context loaded)");
            return Ok(());
        }

        println!("{}", result.merged_context);
        println!();
        println!("Sources ({} rules applied):", result.total_rules_applied);
        for entry in &result.manifest.entries {
            match entry.score {
                Some(score) => println!(
                    "- [{}] {} > {} ({:.3})",
                    entry.block, entry.file, entry.section, score
                ),
                None => println!("- [{}] {} > {}", entry.block, entry.file, entry.section),
            }
        }

        Ok(())
    }
}
