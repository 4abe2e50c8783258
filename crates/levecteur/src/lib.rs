//! levecteur - Sentence Vector Store
//!
//! *Le Vecteur* (The Vector) - Persisted sentence embeddings with cosine nearest-neighbour queries

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Cosine distance and embedding blob encoding.
pub mod distance;
/// Vector store errors.
pub mod error;
/// SQLite-backed vector store.
pub mod sqlite;
/// Vector store capability and record types.
pub mod store;

pub use distance::{cosine_distance, cosine_similarity};
pub use error::{Result, StoreError};
pub use sqlite::{SqliteVectorStore, StorageConfig, DEFAULT_DIMENSION};
pub use store::{check_embedding, Neighbor, SentenceRecord, VectorStore};
