//! OpenAI embeddings (`/v1/embeddings`), requesting the collection's dimensionality.

use crate::embeddings::provider::{check_dimensions, ensure_text, error_from_response, http_client};
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use devmind_core::{AppError, AppResult, EmbeddingConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    pub fn new(config: &EmbeddingConfig, dimensions: usize) -> AppResult<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("OPENAI_API_KEY is required for the openai provider".to_string())
            })?;

        Ok(Self {
            client: http_client("OpenAI", config.timeout_secs)?,
            api_key,
            model: config.openai_model.clone(),
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "openai", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        ensure_text("OpenAI", text)?;

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse OpenAI response: {}", e)))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::Provider("OpenAI returned no embeddings".to_string()))?;

        check_dimensions("OpenAI", embedding, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
