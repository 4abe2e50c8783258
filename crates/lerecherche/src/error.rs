// Search errors

use leplongement::EmbeddingError;
use levecteur::StoreError;
use thiserror::Error;

/// Result type for search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Request-path failures of [`crate::SearchEngine::search`]
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing query; no external call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding provider failed for the query text
    #[error("Embedding failure: {0}")]
    EmbeddingFailure(#[source] EmbeddingError),

    /// The nearest-neighbour query failed
    #[error("Store failure: {0}")]
    StoreFailure(#[source] StoreError),
}

impl Error {
    /// Short machine-readable reason, safe to hand to clients
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::EmbeddingFailure(_) => "embedding_failure",
            Error::StoreFailure(_) => "store_failure",
        }
    }
}
