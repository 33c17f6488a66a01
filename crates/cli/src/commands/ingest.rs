//! Ingest and sync command handlers.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::{watch::KnowledgeWatcher, Engine};
use std::time::Duration;

use super::{print_json, print_report};

/// Rebuild the whole collection from the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        config.validate_knowledge_base()?;

        let engine = Engine::from_config(config)?;
        let report = engine.ingestor().full_reingest().await?;

        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

/// Re-ingest one file, or everything, optionally watching for changes
#[derive(Args, Debug)]
pub struct SyncCommand {
    /// File to re-ingest, relative to the knowledge base
    #[arg(long)]
    pub file: Option<String>,

    /// Keep running and re-ingest files as they change
    #[arg(long)]
    pub watch: bool,

    /// Debounce window for --watch, in milliseconds
    #[arg(long, default_value = "2000")]
    pub debounce_ms: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SyncCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing sync command");
        tracing::debug!("Sync options: {:?}", self);
        config.validate_knowledge_base()?;

        let engine = Engine::from_config(config)?;
        let ingestor = engine.ingestor();

        let report = match &self.file {
            Some(file) => ingestor.reingest_single_file(file).await?,
            None => ingestor.full_reingest().await?,
        };

        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }

        if self.watch {
            if !self.json {
                println!("Watching {} for changes (Ctrl-C to stop)", ingestor.knowledge_base().display());
            }
            KnowledgeWatcher::new(ingestor.clone())
                .with_debounce(Duration::from_millis(self.debounce_ms))
                .run()
                .await?;
        }

        Ok(())
    }
}
