//! HuggingFace feature-extraction inference endpoint.
//!
//! Depending on the model the endpoint answers with a flat vector or with a
//! vector nested one level deeper; both are accepted.

use crate::embeddings::provider::{check_dimensions, ensure_text, error_from_response, http_client};
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use devmind_core::{AppError, AppResult, EmbeddingConfig};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

const HF_PIPELINE_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction";

#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    client: Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtraction {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

impl FeatureExtraction {
    fn into_vector(self) -> Option<Vec<f32>> {
        match self {
            FeatureExtraction::Flat(v) if !v.is_empty() => Some(v),
            FeatureExtraction::Nested(v) => v.into_iter().next(),
            _ => None,
        }
    }
}

impl HuggingFaceProvider {
    pub fn new(config: &EmbeddingConfig, dimensions: usize) -> AppResult<Self> {
        let api_key = config
            .huggingface_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "HUGGINGFACE_API_KEY is required for the huggingface provider".to_string(),
                )
            })?;

        Ok(Self {
            client: http_client("HuggingFace", config.timeout_secs)?,
            api_key,
            model: config.huggingface_model.clone(),
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "huggingface", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        ensure_text("HuggingFace", text)?;

        let url = format!("{}/{}", HF_PIPELINE_URL, self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": text, "options": { "wait_for_model": true } }))
            .send()
            .await
            .map_err(|e| {
                AppError::Provider(format!("Failed to send request to HuggingFace: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(error_from_response("HuggingFace", response).await);
        }

        let body: FeatureExtraction = response.json().await.map_err(|e| {
            AppError::Provider(format!(
                "HuggingFace returned unexpected embedding format: {}",
                e
            ))
        })?;

        let embedding = body.into_vector().ok_or_else(|| {
            AppError::Provider("HuggingFace returned no embeddings".to_string())
        })?;

        check_dimensions("HuggingFace", embedding, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_nested_responses() {
        let flat: FeatureExtraction = serde_json::from_str("[0.1, 0.2, 0.3]").unwrap();
        assert_eq!(flat.into_vector().unwrap().len(), 3);

        let nested: FeatureExtraction = serde_json::from_str("[[0.1, 0.2], [0.3, 0.4]]").unwrap();
        assert_eq!(nested.into_vector().unwrap(), vec![0.1, 0.2]);

        let empty: FeatureExtraction = serde_json::from_str("[]").unwrap();
        assert!(empty.into_vector().is_none());
    }

    #[test]
    fn test_error_object_is_not_an_embedding() {
        let parsed: Result<FeatureExtraction, _> =
            serde_json::from_str(r#"{"error":"Model is loading"}"#);
        assert!(parsed.is_err());
    }
}
