//! Deterministic sparse embedding provider.
//!
//! Used for the `groq` provider kind (which has no embeddings endpoint) and as
//! the last-resort fallback behind a failing local server.

use crate::embeddings::provider::{ensure_text, EmbeddingProvider};
use devmind_core::AppResult;

/// Hashed bag-of-words embedding.
///
/// Each whitespace-separated, lower-cased token is hashed into bucket
/// `|hash| mod D` and counted; the vector is then L2-normalized. This is
/// keyword-overlap recall only, there is no semantic signal in it.
#[derive(Debug)]
pub struct SparseProvider {
    dimensions: usize,
}

impl SparseProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        for token in lower.split_whitespace() {
            let idx = token_hash(token).unsigned_abs() as usize % self.dimensions;
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

/// 31-multiplier string hash over 32-bit wrapping integers.
fn token_hash(token: &str) -> i32 {
    token.chars().fold(0i32, |hash, c| {
        hash.wrapping_mul(31).wrapping_add(c as i32)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for SparseProvider {
    fn provider_name(&self) -> &str {
        "sparse"
    }

    fn model_name(&self) -> &str {
        "sparse-hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        ensure_text("sparse", text)?;
        Ok(self.generate(text))
    }
}
