// Corpus seeding
//
// Populates an empty store with a fixed bootstrap set so the first search
// has something to match against. Guarded by `count() > 0`; a crash in the
// middle of a pass leaves a partial corpus that later runs will not top up.

use std::sync::Arc;

use leplongement::{EmbeddingError, EmbeddingProvider};
use levecteur::{StoreError, VectorStore};
use thiserror::Error;
use tracing::{info, warn};

/// Sentences inserted into an empty store
pub const BOOTSTRAP_SENTENCES: [&str; 3] = [
    "The sun rises in the east.",
    "A cat is a small, furry mammal.",
    "Go is an open-source programming language.",
];

/// The pre-seed count query failed; nothing was inserted
#[derive(Debug, Error)]
#[error("Could not check sentence count: {0}")]
pub struct SeedCheckFailure(#[source] pub StoreError);

/// One bootstrap sentence could not be stored
#[derive(Debug, Error)]
pub enum SeedItemFailure {
    /// Embedding the sentence failed
    #[error("Failed to embed '{sentence}': {source}")]
    Embed {
        /// The skipped sentence
        sentence: String,
        /// Provider error
        #[source]
        source: EmbeddingError,
    },

    /// Inserting the embedded sentence failed
    #[error("Failed to insert '{sentence}': {source}")]
    Insert {
        /// The skipped sentence
        sentence: String,
        /// Store error
        #[source]
        source: StoreError,
    },
}

impl SeedItemFailure {
    /// The sentence that was skipped
    #[must_use]
    pub fn sentence(&self) -> &str {
        match self {
            SeedItemFailure::Embed { sentence, .. } | SeedItemFailure::Insert { sentence, .. } => {
                sentence
            }
        }
    }
}

/// What a seeding run did
#[derive(Debug)]
pub enum SeedOutcome {
    /// The store already held sentences; nothing was touched
    AlreadySeeded {
        /// Sentence count found before seeding
        existing: u64,
    },

    /// A bootstrap pass ran over the empty store
    Seeded {
        /// Sentences inserted
        inserted: usize,
        /// Sentences skipped, in bootstrap order
        failures: Vec<SeedItemFailure>,
    },
}

impl SeedOutcome {
    /// Number of sentences inserted by this run
    #[must_use]
    pub fn inserted(&self) -> usize {
        match self {
            SeedOutcome::AlreadySeeded { .. } => 0,
            SeedOutcome::Seeded { inserted, .. } => *inserted,
        }
    }
}

/// Fills an empty vector store with the bootstrap corpus
pub struct CorpusSeeder {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    sentences: Vec<String>,
}

impl CorpusSeeder {
    /// Seeder over [`BOOTSTRAP_SENTENCES`]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self::with_sentences(embedder, store, BOOTSTRAP_SENTENCES)
    }

    /// Seeder over a custom sentence list
    pub fn with_sentences<I, S>(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        sentences: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            embedder,
            store,
            sentences: sentences.into_iter().map(Into::into).collect(),
        }
    }

    /// Sentences this seeder inserts into an empty store
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Seed the store if it is empty
    ///
    /// Per-sentence failures are logged and collected into
    /// [`SeedOutcome::Seeded`]; the remaining sentences are still processed.
    ///
    /// # Errors
    ///
    /// Returns [`SeedCheckFailure`] when the initial count query fails. The
    /// caller is expected to log it and carry on with whatever the store holds.
    pub async fn seed(&self) -> Result<SeedOutcome, SeedCheckFailure> {
        let existing = self.store.count().await.map_err(|e| {
            warn!("Could not check sentence count: {}", e);
            SeedCheckFailure(e)
        })?;

        if existing > 0 {
            info!("Database already seeded ({} sentences). Skipping.", existing);
            return Ok(SeedOutcome::AlreadySeeded { existing });
        }

        info!(
            "Seeding database with {} sample sentences using {}...",
            self.sentences.len(),
            self.embedder.model()
        );

        let mut inserted = 0;
        let mut failures = Vec::new();

        for sentence in &self.sentences {
            let embedding = match self.embedder.embed(sentence).await {
                Ok(embedding) => embedding,
                Err(source) => {
                    warn!("Failed to get embedding for '{}': {}", sentence, source);
                    failures.push(SeedItemFailure::Embed {
                        sentence: sentence.clone(),
                        source,
                    });
                    continue;
                }
            };

            if let Err(source) = self.store.insert(sentence, &embedding).await {
                warn!("Failed to insert sentence '{}': {}", sentence, source);
                failures.push(SeedItemFailure::Insert {
                    sentence: sentence.clone(),
                    source,
                });
                continue;
            }

            inserted += 1;
        }

        if failures.is_empty() {
            info!("Database seeding complete! ({} sentences)", inserted);
        } else {
            warn!(
                "Database seeding finished with {} of {} sentences skipped",
                failures.len(),
                self.sentences.len()
            );
        }

        Ok(SeedOutcome::Seeded { inserted, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEmbedder, MemoryVectorStore};

    #[tokio::test]
    async fn test_seed_inserts_bootstrap_sentences() {
        let embedder = Arc::new(FakeEmbedder::new(4));
        let store = Arc::new(MemoryVectorStore::new(4));

        let outcome = CorpusSeeder::new(embedder.clone(), store.clone())
            .seed()
            .await
            .unwrap();

        assert_eq!(outcome.inserted(), 3);
        assert!(matches!(outcome, SeedOutcome::Seeded { ref failures, .. } if failures.is_empty()));
        assert_eq!(store.contents(), BOOTSTRAP_SENTENCES.to_vec());
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn test_seed_skips_populated_store() {
        let embedder = Arc::new(FakeEmbedder::new(2));
        let store = Arc::new(MemoryVectorStore::new(2));
        store.push("already here", vec![1.0, 0.0]);

        let outcome = CorpusSeeder::new(embedder.clone(), store.clone())
            .seed()
            .await
            .unwrap();

        assert!(matches!(outcome, SeedOutcome::AlreadySeeded { existing: 1 }));
        assert_eq!(embedder.calls(), 0);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_seed_embed_failure_is_skipped() {
        let embedder = Arc::new(FakeEmbedder::new(2).failing_on(BOOTSTRAP_SENTENCES[1]));
        let store = Arc::new(MemoryVectorStore::new(2));

        let outcome = CorpusSeeder::new(embedder, store.clone()).seed().await.unwrap();

        match outcome {
            SeedOutcome::Seeded { inserted, failures } => {
                assert_eq!(inserted, 2);
                assert_eq!(failures.len(), 1);
                assert!(matches!(failures[0], SeedItemFailure::Embed { .. }));
                assert_eq!(failures[0].sentence(), BOOTSTRAP_SENTENCES[1]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.contents(), vec![BOOTSTRAP_SENTENCES[0], BOOTSTRAP_SENTENCES[2]]);
    }

    #[tokio::test]
    async fn test_seed_insert_failure_is_skipped() {
        let embedder = Arc::new(FakeEmbedder::new(2));
        let store = Arc::new(MemoryVectorStore::new(2));
        store.fail_insert_of(BOOTSTRAP_SENTENCES[0]);

        let outcome = CorpusSeeder::new(embedder, store.clone()).seed().await.unwrap();

        match outcome {
            SeedOutcome::Seeded { inserted, failures } => {
                assert_eq!(inserted, 2);
                assert!(matches!(failures[0], SeedItemFailure::Insert { .. }));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.insert_calls(), 3);
    }

    #[tokio::test]
    async fn test_seed_count_failure() {
        let embedder = Arc::new(FakeEmbedder::new(2));
        let store = Arc::new(MemoryVectorStore::new(2));
        store.set_fail_count(true);

        let result = CorpusSeeder::new(embedder.clone(), store.clone()).seed().await;

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Could not check sentence count"));
        assert_eq!(embedder.calls(), 0);
        assert_eq!(store.insert_calls(), 0);
    }

    #[test]
    fn test_with_sentences_overrides_bootstrap() {
        let seeder = CorpusSeeder::with_sentences(
            Arc::new(FakeEmbedder::new(2)),
            Arc::new(MemoryVectorStore::new(2)),
            vec!["one", "two"],
        );
        assert_eq!(seeder.sentences(), ["one".to_string(), "two".to_string()]);
    }
}
