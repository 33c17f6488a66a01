//! Embedding provider implementations, one per provider kind.

pub mod gemini;
pub mod huggingface;
pub mod ollama;
pub mod openai;
pub mod sparse;
