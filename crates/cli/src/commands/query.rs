//! Query command handler.
//!
//! Raw semantic search with optional payload filters.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::router::match_percent;
use devmind_knowledge::store::SearchOptions;
use devmind_knowledge::{Category, Engine, Priority};

use super::{chunk_header, print_json};

/// Semantic search over the knowledge base
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Query text
    pub text: String,

    /// Only this category (rule, workflow, template, memory)
    #[arg(long)]
    pub category: Option<Category>,

    /// Only this priority (critical, high, medium, normal)
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Match any of these tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Maximum number of results
    #[arg(short, long, default_value = "5")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing query command");

        let engine = Engine::from_config(config)?;
        let vector = engine.embedder().embed(&self.text).await?;

        let options = SearchOptions {
            limit: self.limit,
            category: self.category,
            priority: self.priority,
            tags: self.tags.clone(),
            ..SearchOptions::default()
        };
        let results = engine.store().search(&vector, &options).await?;

        if self.json {
            return print_json(&results);
        }

        if results.is_empty() {
            println!("No results above the relevance threshold");
            return Ok(());
        }

        for (i, hit) in results.iter().enumerate() {
            println!(
                "{}. {}% {}",
                i + 1,
                match_percent(hit.score),
                chunk_header(&hit.chunk)
            );
        }

        Ok(())
    }
}
