//! In-process test doubles for the two external collaborators.
//!
//! Both record how often they were called so tests can assert that a code
//! path never reached the provider or the store.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash as _, Hasher as _};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use leplongement::{Embedding, EmbeddingError, EmbeddingProvider};
use levecteur::{check_embedding, cosine_distance, Neighbor, SentenceRecord, StoreError, VectorStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted embedding provider
///
/// Texts registered with [`FakeEmbedder::with`] map to fixed vectors; other
/// texts get the default vector if one is set, else a deterministic
/// hash-based vector of the configured dimension.
pub struct FakeEmbedder {
    dimension: usize,
    model: String,
    scripted: HashMap<String, Embedding>,
    default: Option<Embedding>,
    failing: HashSet<String>,
    fail_all: bool,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    /// Create a fake producing `dimension`-long vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model: "fake-embed".to_string(),
            scripted: HashMap::new(),
            default: None,
            failing: HashSet::new(),
            fail_all: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Map `text` to a fixed vector
    #[must_use]
    pub fn with(mut self, text: impl Into<String>, embedding: Embedding) -> Self {
        self.scripted.insert(text.into(), embedding);
        self
    }

    /// Vector returned for any text without a scripted one
    #[must_use]
    pub fn with_default(mut self, embedding: Embedding) -> Self {
        self.default = Some(embedding);
        self
    }

    /// Fail whenever `text` is embedded
    #[must_use]
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.insert(text.into());
        self
    }

    /// Fail every call
    #[must_use]
    pub fn failing_always(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Number of `embed` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hashed(&self, text: &str) -> Embedding {
        (0..self.dimension)
            .map(|idx| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                idx.hash(&mut hasher);
                // Spread into [-1, 1) so different texts point different ways
                (hasher.finish() % 2000) as f32 / 1000.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> leplongement::Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_all || self.failing.contains(text) {
            return Err(EmbeddingError::Request(format!(
                "scripted failure for '{}'",
                text
            )));
        }

        Ok(self
            .scripted
            .get(text)
            .or(self.default.as_ref())
            .cloned()
            .unwrap_or_else(|| self.hashed(text)))
    }
}

/// Brute-force in-memory vector store
///
/// Same contract as the SQLite store: ascending cosine distance, insertion
/// order on ties, dimension enforced on insert and query. Failures and an
/// unsorted answer can be switched on while the store is shared.
pub struct MemoryVectorStore {
    dimension: usize,
    records: Mutex<Vec<SentenceRecord>>,
    failing_inserts: Mutex<HashSet<String>>,
    last_limit: Mutex<Option<usize>>,
    fail_count: AtomicBool,
    fail_queries: AtomicBool,
    reverse_results: AtomicBool,
    insert_calls: AtomicUsize,
    query_calls: AtomicUsize,
    count_calls: AtomicUsize,
}

impl MemoryVectorStore {
    /// Create an empty store for `dimension`-long vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: Mutex::new(Vec::new()),
            failing_inserts: Mutex::new(HashSet::new()),
            last_limit: Mutex::new(None),
            fail_count: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
            reverse_results: AtomicBool::new(false),
            insert_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
        }
    }

    /// Add a record directly, bypassing call counting and failure injection
    pub fn push(&self, content: impl Into<String>, embedding: Vec<f32>) {
        lock(&self.records).push(SentenceRecord::new(content, embedding));
    }

    /// Snapshot of stored sentence texts in insertion order
    pub fn contents(&self) -> Vec<String> {
        lock(&self.records)
            .iter()
            .map(|record| record.content.clone())
            .collect()
    }

    /// Make `count` fail
    pub fn set_fail_count(&self, fail: bool) {
        self.fail_count.store(fail, Ordering::SeqCst);
    }

    /// Make `nearest_neighbors` fail
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make inserting `content` fail
    pub fn fail_insert_of(&self, content: impl Into<String>) {
        lock(&self.failing_inserts).insert(content.into());
    }

    /// Answer nearest-neighbour queries farthest-first
    pub fn set_reverse_results(&self, reverse: bool) {
        self.reverse_results.store(reverse, Ordering::SeqCst);
    }

    /// Number of `insert` calls so far
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Number of `nearest_neighbors` calls so far
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of `count` calls so far
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Limit passed to the most recent `nearest_neighbors` call
    pub fn last_limit(&self) -> Option<usize> {
        *lock(&self.last_limit)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert(&self, content: &str, embedding: &[f32]) -> levecteur::Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if lock(&self.failing_inserts).contains(content) {
            return Err(StoreError::Unavailable(format!(
                "scripted insert failure for '{}'",
                content
            )));
        }

        let record = SentenceRecord::new(content, embedding.to_vec());
        record.validate(self.dimension)?;
        lock(&self.records).push(record);
        Ok(())
    }

    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> levecteur::Result<Vec<Neighbor>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_limit) = Some(limit);

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("scripted query failure".to_string()));
        }
        check_embedding(embedding, self.dimension)?;

        let mut neighbors: Vec<Neighbor> = lock(&self.records)
            .iter()
            .map(|record| Neighbor::new(record.content.clone(), cosine_distance(embedding, &record.embedding)))
            .collect();

        // Stable: equal distances stay in insertion order
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(limit);

        if self.reverse_results.load(Ordering::SeqCst) {
            neighbors.reverse();
        }
        Ok(neighbors)
    }

    async fn count(&self) -> levecteur::Result<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_count.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("scripted count failure".to_string()));
        }
        Ok(lock(&self.records).len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_embedder_is_deterministic() {
        let embedder = FakeEmbedder::new(8);
        let a = embedder.embed("hello").await.unwrap();
        let b = embedder.embed("hello").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert_eq!(embedder.calls(), 2);
    }

    #[tokio::test]
    async fn test_fake_embedder_scripted_failure() {
        let embedder = FakeEmbedder::new(2).failing_on("boom");
        assert!(embedder.embed("boom").await.is_err());
        assert!(embedder.embed("fine").await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_reverse_results() {
        let store = MemoryVectorStore::new(2);
        store.push("near", vec![1.0, 0.0]);
        store.push("far", vec![0.0, 1.0]);
        store.set_reverse_results(true);

        let neighbors = store.nearest_neighbors(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(neighbors[0].content, "far");
        assert_eq!(neighbors[1].content, "near");
    }
}
