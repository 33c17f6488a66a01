//! Embedding engine.
//!
//! Wraps the configured provider together with an optional fallback provider.
//! A failing local server is retried once against the fallback; every other
//! failure propagates unchanged.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use devmind_core::{AppResult, EmbeddingConfig};
use std::sync::Arc;

/// The active embedding provider plus its optional fallback.
#[derive(Debug, Clone)]
pub struct Embedder {
    primary: Arc<dyn EmbeddingProvider>,
    fallback: Option<Arc<dyn EmbeddingProvider>>,
}

impl Embedder {
    pub fn new(primary: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn EmbeddingProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn primary(&self) -> &dyn EmbeddingProvider {
        self.primary.as_ref()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn dimensions(&self) -> usize {
        self.primary.dimensions()
    }

    /// Embed one text, retrying once on the fallback provider if there is one.
    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        match self.primary.embed(text).await {
            Ok(vector) => Ok(vector),
            Err(err) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(
                        "{} failed, falling back to {}: {}",
                        self.primary.provider_name(),
                        fallback.provider_name(),
                        err
                    );
                    fallback.embed(text).await
                }
                None => Err(err),
            },
        }
    }
}

/// Build the embedder selected by configuration.
///
/// When the active provider is the local server and a Groq key is configured,
/// the sparse provider is attached as fallback.
pub fn create_embedder(config: &EmbeddingConfig, dimensions: usize) -> AppResult<Embedder> {
    let primary = create_provider(config, dimensions)?;
    let mut embedder = Embedder::new(primary);

    let groq_key_set = config
        .groq_api_key
        .as_deref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);

    if config.provider.is_local() && groq_key_set {
        tracing::debug!("GROQ_API_KEY set: sparse fallback enabled for ollama");
        embedder = embedder.with_fallback(Arc::new(providers::sparse::SparseProvider::new(
            dimensions,
        )));
    }

    Ok(embedder)
}
