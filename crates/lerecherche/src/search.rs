// Core search engine implementation

use std::sync::Arc;

use leplongement::EmbeddingProvider;
use levecteur::{Neighbor, VectorStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Number of results returned when nothing else is configured
pub const DEFAULT_TOP_K: usize = 5;

/// Search engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum results to return
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Search result
///
/// `similarity` is `1 - cosine distance`: 1.0 for an identical direction,
/// lower for less similar sentences, with no fixed lower bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Stored sentence text
    pub content: String,

    /// Similarity score
    pub similarity: f64,
}

impl From<Neighbor> for SearchResult {
    fn from(neighbor: Neighbor) -> Self {
        Self {
            content: neighbor.content,
            similarity: 1.0 - neighbor.distance,
        }
    }
}

/// Shape store neighbours into ranked results
///
/// Stable descending sort on similarity, so an already-sorted store answer
/// comes back unchanged and equal scores keep the store's order; then
/// truncates to `top_k`.
pub fn rank_neighbors(neighbors: Vec<Neighbor>, top_k: usize) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = neighbors.into_iter().map(SearchResult::from).collect();
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(top_k);
    results
}

/// Search engine over an embedding provider and a vector store
pub struct SearchEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create a new search engine with the default top-K
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self::with_config(embedder, store, SearchConfig::default())
    }

    /// Create a new search engine with explicit configuration
    pub fn with_config(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Maximum number of results per query
    #[must_use]
    pub fn top_k(&self) -> usize {
        self.config.top_k
    }

    /// Execute a search query
    ///
    /// # Returns
    ///
    /// At most `top_k` results sorted by similarity, descending. An empty
    /// store yields an empty list.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidInput` - empty query; neither collaborator is called.
    ///   Whitespace is a valid query and is embedded as-is.
    /// * `Error::EmbeddingFailure` - the provider failed; the store is not queried
    /// * `Error::StoreFailure` - the nearest-neighbour query failed
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        if query.is_empty() {
            return Err(Error::InvalidInput("query text must not be empty".to_string()));
        }

        debug!("Searching: q='{}', top_k={}", query, self.config.top_k);

        let embedding = self.embedder.embed(query).await.map_err(|e| {
            error!("Failed to get query embedding: {}", e);
            Error::EmbeddingFailure(e)
        })?;

        let neighbors = self
            .store
            .nearest_neighbors(&embedding, self.config.top_k)
            .await
            .map_err(|e| {
                error!("Nearest-neighbour query failed: {}", e);
                Error::StoreFailure(e)
            })?;

        Ok(rank_neighbors(neighbors, self.config.top_k))
    }
}
