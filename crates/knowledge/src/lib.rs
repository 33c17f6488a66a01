//! Knowledge-base retrieval engine.
//!
//! Chunks a markdown knowledge base, embeds the chunks into a vector store and
//! assembles prompt context from deterministic and semantic sources.

pub mod chunk;
pub mod embeddings;
pub mod ingest;
pub mod memory_notes;
pub mod router;
pub mod store;
pub mod watch;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunk::{Category, Chunk, Priority};
pub use embeddings::{create_embedder, Embedder, EmbeddingProvider};
pub use ingest::{IngestFailure, IngestReport, Ingestor};
pub use memory_notes::{save_memory, MemorySummary};
pub use router::{ContextRouter, RouteResult, SourceManifest};
pub use store::{CollectionInfo, InMemoryStore, QdrantStore, ScoredChunk, VectorStore};
pub use watch::KnowledgeWatcher;

use devmind_core::{AppConfig, AppResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Store, embedder, router and ingestor wired from one configuration.
pub struct Engine {
    store: Arc<dyn VectorStore>,
    embedder: Embedder,
    router: ContextRouter,
    ingestor: Ingestor,
}

impl Engine {
    /// Qdrant store plus the configured embedding provider.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store: Arc<dyn VectorStore> = Arc::new(QdrantStore::new(&config.qdrant)?);
        let embedder = create_embedder(&config.embedding, config.qdrant.vector_size)?;

        tracing::debug!(
            "Engine: collection '{}', provider {} ({})",
            config.qdrant.collection,
            embedder.primary().provider_name(),
            embedder.primary().model_name()
        );

        Ok(Self::new(
            store,
            embedder,
            config.knowledge_base_root(),
            &config.identity_document,
        ))
    }

    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Embedder,
        knowledge_base: PathBuf,
        identity_document: &str,
    ) -> Self {
        let router = ContextRouter::new(store.clone(), embedder.clone(), identity_document);
        let ingestor = Ingestor::new(knowledge_base, embedder.clone(), store.clone());

        Self {
            store,
            embedder,
            router,
            ingestor,
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn router(&self) -> &ContextRouter {
        &self.router
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }
}
