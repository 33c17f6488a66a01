//! Status command handler.
//!
//! Shows configuration, provider and collection state.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::Engine;

use super::print_json;

/// Show configuration and collection status
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing status command");

        let engine = Engine::from_config(config)?;
        let collection = engine.store().collection_info().await?;
        let provider = engine.embedder().primary();
        let knowledge_base = config.knowledge_base_root();

        if self.json {
            return print_json(&serde_json::json!({
                "qdrantUrl": config.qdrant.url,
                "collection": config.qdrant.collection,
                "vectorSize": config.qdrant.vector_size,
                "provider": provider.provider_name(),
                "model": provider.model_name(),
                "fallback": engine.embedder().has_fallback(),
                "knowledgeBase": knowledge_base,
                "knowledgeBaseExists": knowledge_base.is_dir(),
                "collectionInfo": collection,
            }));
        }

        println!("Qdrant:         {}", config.qdrant.url);
        println!(
            "Provider:       {} ({}){}",
            provider.provider_name(),
            provider.model_name(),
            if engine.embedder().has_fallback() {
                ", sparse fallback enabled"
            } else {
                ""
            }
        );
        println!(
            "Knowledge base: {}{}",
            knowledge_base.display(),
            if knowledge_base.is_dir() { "" } else { " (missing)" }
        );

        match collection {
            Some(info) => println!(
                "Collection:     {} ({} points, {}-dim, {})",
                info.name, info.points_count, info.vector_size, info.status
            ),
            None => println!(
                "Collection:     {} (not ingested, run 'devmind ingest')",
                config.qdrant.collection
            ),
        }

        Ok(())
    }
}
