//! devmind CLI
//!
//! Main entry point for the devmind command-line tool.
//! Ingests a markdown knowledge base into Qdrant and assembles prompt context.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    ContextCommand, IngestCommand, MemoryCommand, QueryCommand, ResetCommand, RulesCommand,
    StatusCommand, SyncCommand,
};
use devmind_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// devmind - retrieval-augmented context for coding agents
#[derive(Parser, Debug)]
#[command(name = "devmind")]
#[command(about = "Knowledge-base ingestion and context routing", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DEVMIND_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DEVMIND_CONFIG")]
    config: Option<PathBuf>,

    /// Knowledge base root (default: .agent under the workspace)
    #[arg(long, global = true)]
    knowledge_base: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the collection from the whole knowledge base
    Ingest(IngestCommand),

    /// Re-ingest one file or everything, optionally watching for changes
    Sync(SyncCommand),

    /// Semantic search with optional filters
    Query(QueryCommand),

    /// Build prompt context for a task
    Context(ContextCommand),

    /// List stored rules
    Rules(RulesCommand),

    /// Save a conversation summary
    Memory(MemoryCommand),

    /// Show configuration and collection status
    Status(StatusCommand),

    /// Delete the collection
    Reset(ResetCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the config file and environment
    let config = AppConfig::load(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.knowledge_base, cli.log_level, cli.verbose, cli.no_color);

    // Initialize logging with final configuration
    logging::init_from_config(&config)?;

    tracing::info!("devmind starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Knowledge base: {:?}", config.knowledge_base_root());
    tracing::debug!(
        "Embedding provider: {} (collection '{}', {}-dim)",
        config.embedding.provider,
        config.qdrant.collection,
        config.qdrant.vector_size
    );

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Sync(_) => "sync",
        Commands::Query(_) => "query",
        Commands::Context(_) => "context",
        Commands::Rules(_) => "rules",
        Commands::Memory(_) => "memory",
        Commands::Status(_) => "status",
        Commands::Reset(_) => "reset",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Sync(cmd) => cmd.execute(&config).await,
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Context(cmd) => cmd.execute(&config).await,
        Commands::Rules(cmd) => cmd.execute(&config).await,
        Commands::Memory(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
        Commands::Reset(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
