// Vector store errors

use thiserror::Error;

/// Result type for vector store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`crate::VectorStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure (open, schema, query)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Provided embedding dimension does not match the store dimension
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension the store was opened with
        expected: usize,
        /// Dimension of the rejected vector
        got: usize,
    },

    /// The embedding contains NaN or infinite components, or a stored blob is corrupt
    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(String),

    /// The blocking storage task could not complete
    #[error("Storage task failed: {0}")]
    Task(String),

    /// Backend-specific failure reported by a non-SQLite store
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::DimensionMismatch { expected: 3, got: 2 };
        assert_eq!(format!("{}", err), "Dimension mismatch: expected 3, got 2");

        let err = StoreError::InvalidEmbedding("NaN at 1".to_string());
        assert_eq!(format!("{}", err), "Invalid embedding: NaN at 1");

        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(format!("{}", err), "Store unavailable: connection refused");
    }
}
