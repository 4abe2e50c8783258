// Vector store capability
//
// The engine and the seeder only ever see a store through this trait, so
// a SQLite file, an in-memory double or a remote vector database can sit
// behind the same calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A persisted sentence and its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Sentence text (not guaranteed unique)
    pub content: String,

    /// Embedding vector, exactly the store dimension long
    pub embedding: Vec<f32>,
}

impl SentenceRecord {
    /// Create a new sentence record
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            content: content.into(),
            embedding,
        }
    }

    /// Check the record against the store dimension
    ///
    /// # Returns
    ///
    /// `Err(StoreError::DimensionMismatch)` if the length differs from `dimension`,
    /// `Err(StoreError::InvalidEmbedding)` if a component is NaN or infinite
    pub fn validate(&self, dimension: usize) -> Result<()> {
        check_embedding(&self.embedding, dimension)
    }
}

/// Validate a raw embedding against a store dimension
pub fn check_embedding(embedding: &[f32], dimension: usize) -> Result<()> {
    if embedding.len() != dimension {
        return Err(StoreError::DimensionMismatch {
            expected: dimension,
            got: embedding.len(),
        });
    }

    if let Some(position) = embedding.iter().position(|c| !c.is_finite()) {
        return Err(StoreError::InvalidEmbedding(format!(
            "non-finite component at index {}",
            position
        )));
    }

    Ok(())
}

/// One row of a nearest-neighbour answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Stored sentence text
    pub content: String,

    /// Cosine distance to the query vector (smaller is closer)
    pub distance: f64,
}

impl Neighbor {
    /// Create a new neighbour
    pub fn new(content: impl Into<String>, distance: f64) -> Self {
        Self {
            content: content.into(),
            distance,
        }
    }
}

/// Persistent store of sentence embeddings
///
/// Implementations must be safe for concurrent use by many in-flight
/// searches; none of the methods take `&mut self`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist one `(content, embedding)` pair
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding does not match the store dimension
    /// or the write fails
    async fn insert(&self, content: &str, embedding: &[f32]) -> Result<()>;

    /// Return up to `limit` stored sentences ordered by ascending cosine distance
    ///
    /// Rows with equal distance come back in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query vector does not match the store
    /// dimension or the read fails
    async fn nearest_neighbors(&self, embedding: &[f32], limit: usize) -> Result<Vec<Neighbor>>;

    /// Number of stored sentences
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails
    async fn count(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_validate_ok() {
        let record = SentenceRecord::new("The sun rises in the east.", vec![0.1, 0.2, 0.3]);
        assert!(record.validate(3).is_ok());
    }

    #[test]
    fn test_record_validate_dimension_mismatch() {
        let record = SentenceRecord::new("short", vec![0.1, 0.2]);
        match record.validate(3) {
            Err(StoreError::DimensionMismatch { expected, got }) => {
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("expected dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_record_validate_rejects_nan() {
        let record = SentenceRecord::new("nan", vec![0.1, f32::NAN, 0.3]);
        assert!(matches!(record.validate(3), Err(StoreError::InvalidEmbedding(_))));
    }

    #[test]
    fn test_record_validate_rejects_infinity() {
        assert!(check_embedding(&[f32::INFINITY], 1).is_err());
    }
}
