//! Rules command handler.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::store::{ScrollOptions, DEFAULT_SCROLL_LIMIT};
use devmind_knowledge::{Category, Engine, Priority};

use super::{chunk_header, print_json};

/// List stored chunks, optionally filtered
#[derive(Args, Debug)]
pub struct RulesCommand {
    /// Only this category (rule, workflow, template, memory)
    #[arg(long)]
    pub category: Option<Category>,

    /// Only this priority (critical, high, medium, normal)
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Maximum number of chunks
    #[arg(short, long, default_value_t = DEFAULT_SCROLL_LIMIT)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RulesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing rules command");

        let engine = Engine::from_config(config)?;
        let options = ScrollOptions {
            limit: self.limit,
            category: self.category,
            priority: self.priority,
        };
        let chunks = engine.store().scroll_all(&options).await?;

        if self.json {
            return print_json(&chunks);
        }

        for chunk in &chunks {
            println!("{}", chunk_header(chunk));
        }
        println!("{} chunks", chunks.len());

        Ok(())
    }
}
