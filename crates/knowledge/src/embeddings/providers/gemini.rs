//! Google Gemini embeddings via the `embedContent` REST method.

use crate::embeddings::provider::{check_dimensions, ensure_text, error_from_response, http_client};
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use devmind_core::{AppError, AppResult, EmbeddingConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
    output_dimensionality: usize,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl GeminiProvider {
    pub fn new(config: &EmbeddingConfig, dimensions: usize) -> AppResult<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("GEMINI_API_KEY is required for the gemini provider".to_string())
            })?;

        Ok(Self {
            client: http_client("Gemini", config.timeout_secs)?,
            api_key,
            model: config.gemini_model.clone(),
            dimensions,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:embedContent", GEMINI_API_BASE, self.model)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "gemini", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        ensure_text("Gemini", text)?;

        let request = EmbedContentRequest {
            content: Content {
                parts: vec![Part { text }],
            },
            output_dimensionality: self.dimensions,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let body: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Gemini response: {}", e)))?;

        check_dimensions("Gemini", body.embedding.values, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
