//! lerecherche - Semantic Sentence Search
//!
//! *La Recherche* (The Search) - Query embedding, nearest-neighbour lookup and corpus seeding
//!
//! Retrieval core: the [`SearchEngine`] answers queries, the [`CorpusSeeder`]
//! makes sure the store holds something to answer from.
//!
//! Both take their collaborators as `Arc<dyn EmbeddingProvider>` and
//! `Arc<dyn VectorStore>`; nothing here reaches for process-wide state.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Search error taxonomy
pub mod error;

/// Query pipeline and result ranking
pub mod search;

/// Bootstrap corpus seeding
pub mod seed;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
pub use search::{rank_neighbors, SearchConfig, SearchEngine, SearchResult, DEFAULT_TOP_K};
pub use seed::{CorpusSeeder, SeedCheckFailure, SeedItemFailure, SeedOutcome, BOOTSTRAP_SENTENCES};
