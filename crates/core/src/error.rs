//! Error types for devmind.
//!
//! One enum covers every failure class of the retrieval engine: configuration,
//! embedding providers, the vector store, chunking, and caller input.

use thiserror::Error;

/// Unified error type for devmind.
///
/// All fallible functions return `Result<T, AppError>`. Provider and store
/// failures are converted into one of these variants at the boundary of the
/// operation that issued them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required setting missing or inconsistent. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding call failed (after any configured fallback).
    #[error("Embedding provider error: {0}")]
    Provider(String),

    /// Vector store unreachable or request rejected.
    #[error("Vector store error: {0}")]
    Store(String),

    /// The collection does not exist yet (nothing has been ingested).
    #[error("Collection '{0}' not found. Run 'devmind ingest' first.")]
    CollectionNotFound(String),

    /// Knowledge-base source could not be read during ingestion.
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// Invalid caller input (empty task, empty summary, ...)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// True when the error means "the collection has not been ingested yet".
    pub fn is_not_ingested(&self) -> bool {
        matches!(self, AppError::CollectionNotFound(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_not_found_is_not_ingested() {
        let err = AppError::CollectionNotFound("senior_dev_mind".to_string());
        assert!(err.is_not_ingested());
        assert!(err.to_string().contains("senior_dev_mind"));

        let err = AppError::Store("connection refused".to_string());
        assert!(!err.is_not_ingested());
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
