// SQLite vector store
//
// *Le Stockage* (The Storage) - Sentence table, f32 blob embeddings and a
// registered `cosine_distance` SQL function for nearest-neighbour queries

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::{cosine_distance, decode_embedding, encode_embedding};
use crate::error::{Result, StoreError};
use crate::store::{check_embedding, Neighbor, SentenceRecord, VectorStore};

/// Default embedding dimension (mxbai-embed-large)
pub const DEFAULT_DIMENSION: usize = 1024;

/// Default database path
pub const DEFAULT_DB_PATH: &str = "lesens.db";

/// Nearest-neighbour query; `id` breaks distance ties in insertion order
const NEAREST_SQL: &str = "SELECT content, cosine_distance(embedding, ?1) AS distance
     FROM sentences
     ORDER BY distance ASC, id ASC
     LIMIT ?2";

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database path (`:memory:` for a private in-memory database)
    pub db_path: String,

    /// Dimension every stored embedding must have
    pub dimension: usize,

    /// Whether to enable WAL mode
    pub wal_enabled: bool,

    /// Cache size in pages
    pub cache_size_pages: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            dimension: DEFAULT_DIMENSION,
            wal_enabled: true,
            cache_size_pages: Some(10000),
        }
    }
}

impl StorageConfig {
    /// Create a config for `db_path` holding `dimension`-long embeddings
    #[must_use]
    pub fn new(db_path: impl Into<String>, dimension: usize) -> Self {
        Self {
            db_path: db_path.into(),
            dimension,
            ..Self::default()
        }
    }
}

/// SQLite-backed [`VectorStore`]
///
/// Uses `Arc<Mutex<Connection>>` because `rusqlite::Connection` is not `Sync`.
/// Every operation runs on the blocking thread pool; when the awaiting
/// request is cancelled the blocking result is discarded.
pub struct SqliteVectorStore {
    conn: Arc<Mutex<Connection>>,
    config: StorageConfig,
}

impl SqliteVectorStore {
    /// Open storage with custom config
    ///
    /// Creates the `sentences` table if needed and registers the
    /// `cosine_distance` function on the connection.
    pub fn open_with_config(config: StorageConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(StoreError::InvalidEmbedding(
                "store dimension must be greater than zero".to_string(),
            ));
        }

        let conn = Connection::open(&config.db_path)?;

        if config.wal_enabled {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            debug!("journal_mode set to {}", mode);
        }

        if let Some(cache_size) = config.cache_size_pages {
            conn.pragma_update(None, "cache_size", cache_size)?;
        }

        register_functions(&conn)?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Open a private in-memory store
    pub fn open_in_memory(dimension: usize) -> Result<Self> {
        Self::open_with_config(StorageConfig {
            db_path: ":memory:".to_string(),
            dimension,
            wal_enabled: false,
            cache_size_pages: None,
        })
    }

    /// Store configuration
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Dimension every stored embedding has
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn with_conn<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Task("connection lock poisoned".to_string()))?;
            operation(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn insert(&self, content: &str, embedding: &[f32]) -> Result<()> {
        let record = SentenceRecord::new(content, embedding.to_vec());
        record.validate(self.config.dimension)?;

        let blob = encode_embedding(&record.embedding);
        let content = record.content;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO sentences (content, embedding) VALUES (?1, ?2)",
                params![content, blob],
            )?;
            Ok(())
        })
        .await
    }

    async fn nearest_neighbors(&self, embedding: &[f32], limit: usize) -> Result<Vec<Neighbor>> {
        check_embedding(embedding, self.config.dimension)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let blob = encode_embedding(embedding);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(NEAREST_SQL)?;
            let rows = stmt.query_map(params![blob, limit], |row| {
                Ok(Neighbor {
                    content: row.get(0)?,
                    distance: row.get(1)?,
                })
            })?;
            let neighbors = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(neighbors)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM sentences", [], |row| row.get(0))?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
        .await
    }
}

/// Initialize database schema
fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sentences (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            embedding BLOB NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Register `cosine_distance(stored_blob, query_blob)` on the connection
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "cosine_distance",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let stored = blob_argument(ctx, 0)?;
            let query = blob_argument(ctx, 1)?;
            if stored.len() != query.len() {
                return Err(function_error(format!(
                    "dimension mismatch: stored {}, query {}",
                    stored.len(),
                    query.len()
                )));
            }
            Ok(cosine_distance(&stored, &query))
        },
    )
}

fn blob_argument(ctx: &Context<'_>, idx: usize) -> rusqlite::Result<Vec<f32>> {
    let bytes = ctx
        .get_raw(idx)
        .as_blob()
        .map_err(|e| function_error(e.to_string()))?;
    decode_embedding(bytes).map_err(|e| function_error(e.to_string()))
}

fn function_error(message: String) -> rusqlite::Error {
    rusqlite::Error::UserFunctionError(message.into())
}
