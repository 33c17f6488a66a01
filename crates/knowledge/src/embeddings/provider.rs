//! Embedding provider trait and factory.

use devmind_core::{AppError, AppResult, EmbeddingConfig, EmbeddingProviderKind};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::providers::{
    gemini::GeminiProvider, huggingface::HuggingFaceProvider, ollama::OllamaProvider,
    openai::OpenAiProvider, sparse::SparseProvider,
};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "openai", "sparse")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate the embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create the provider selected by configuration.
pub fn create_provider(
    config: &EmbeddingConfig,
    dimensions: usize,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::Ollama => Arc::new(OllamaProvider::new(config, dimensions)?),
        EmbeddingProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config, dimensions)?),
        EmbeddingProviderKind::Gemini => Arc::new(GeminiProvider::new(config, dimensions)?),
        EmbeddingProviderKind::HuggingFace => {
            Arc::new(HuggingFaceProvider::new(config, dimensions)?)
        }
        EmbeddingProviderKind::Groq => Arc::new(SparseProvider::new(dimensions)),
    };

    tracing::debug!(
        "Created embedding provider: provider={}, model={}, dimensions={}",
        provider.provider_name(),
        provider.model_name(),
        provider.dimensions()
    );

    Ok(provider)
}

/// Shared HTTP client construction for the remote providers.
pub(crate) fn http_client(provider: &str, timeout_secs: u64) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| {
            AppError::Provider(format!("Failed to create HTTP client for {}: {}", provider, e))
        })
}

/// Reject empty input before any network call.
pub(crate) fn ensure_text(provider: &str, text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Provider(format!(
            "{}: cannot embed empty text",
            provider
        )));
    }
    Ok(())
}

/// Every vector handed to the store must have the collection's dimensionality.
pub(crate) fn check_dimensions(
    provider: &str,
    vector: Vec<f32>,
    expected: usize,
) -> AppResult<Vec<f32>> {
    if vector.len() != expected {
        return Err(AppError::Provider(format!(
            "{} returned {} dimensions, expected {}",
            provider,
            vector.len(),
            expected
        )));
    }
    Ok(vector)
}

/// Turn a non-success HTTP response into a provider error carrying the body.
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::Provider(format!("{} API error ({}): {}", provider, status, body))
}
