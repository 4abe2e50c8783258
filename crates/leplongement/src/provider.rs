// Embedding provider capability

use async_trait::async_trait;

use crate::error::Result;

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Trait for generating embeddings from text
///
/// Implementations are shared between the seeder and every in-flight
/// search, so they must be `Send + Sync` and must not require `&mut self`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the model producing the vectors
    fn model(&self) -> &str;

    /// Generate embedding for text
    ///
    /// # Errors
    /// Returns an error if the provider is unreachable, times out, or
    /// answers without a vector
    async fn embed(&self, text: &str) -> Result<Embedding>;
}
