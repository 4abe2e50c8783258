//! leplongement - Text Embedding Provider
//!
//! *Le Plongement* (The Embedding) - Turns sentences into fixed-dimension vectors

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Embedding provider errors
pub mod error;

/// Ollama-backed embedding provider
pub mod ollama;

/// Embedding provider capability
pub mod provider;

pub use error::{EmbeddingError, Result};
pub use ollama::{OllamaConfig, OllamaEmbedder, DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_HOST};
pub use provider::{Embedding, EmbeddingProvider};
