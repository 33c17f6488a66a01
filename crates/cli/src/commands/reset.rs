//! Reset command handler.

use clap::Args;
use devmind_core::{config::AppConfig, AppResult};
use devmind_knowledge::Engine;
use std::io::{self, BufRead, Write};

/// Delete the collection (irreversible)
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reset command");

        if !self.yes && !confirm(&config.qdrant.collection)? {
            println!("Aborted");
            return Ok(());
        }

        let engine = Engine::from_config(config)?;
        engine.store().delete_collection().await?;
        println!("Collection '{}' deleted", config.qdrant.collection);

        Ok(())
    }
}

fn confirm(collection: &str) -> AppResult<bool> {
    print!("Delete collection '{}' and all its points? [y/N] ", collection);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
