//! Devmind Core Library
//!
//! This crate provides the foundational utilities shared by the devmind crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (Qdrant, embedding provider, knowledge base)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingConfig, EmbeddingProviderKind, QdrantConfig};
pub use error::{AppError, AppResult};
