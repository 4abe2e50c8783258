// Embedding provider errors

use thiserror::Error;

/// Result type for embedding operations
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors raised while producing an embedding
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The provider could not be reached or rejected the request
    #[error("Embedding request failed: {0}")]
    Request(String),

    /// The configured model is not installed on the provider
    #[error("Embedding model '{0}' not found")]
    ModelNotFound(String),

    /// The provider answered without a usable vector
    #[error("No embedding returned")]
    EmptyResponse,

    /// The provider did not answer within the adapter timeout
    #[error("Embedding request timed out after {0}s")]
    Timeout(u64),

    /// The provider client could not be constructed
    #[error("Invalid embedding provider configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_messages() {
        let err = EmbeddingError::ModelNotFound("mxbai-embed-large".to_string());
        assert_eq!(format!("{}", err), "Embedding model 'mxbai-embed-large' not found");

        let err = EmbeddingError::Timeout(30);
        assert_eq!(format!("{}", err), "Embedding request timed out after 30s");

        let err = EmbeddingError::EmptyResponse;
        assert_eq!(format!("{}", err), "No embedding returned");
    }
}
