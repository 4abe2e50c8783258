//! HTTP handlers for the search API

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use lerecherche::{SearchEngine, SearchResult};
use levecteur::VectorStore;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Query parameters for the search endpoint
#[derive(Debug, Default)]
pub struct SearchQuery {
    /// Search query string
    pub q: Option<String>,
}

impl SearchQuery {
    /// Pick the parameters out of decoded query pairs; the first `q` wins
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let q = pairs
            .into_iter()
            .find_map(|(key, value)| (key == "q").then_some(value));
        Self { q }
    }
}

/// State shared across all handlers
///
/// Nothing here is mutated after startup; the store handles its own locking.
#[derive(Clone)]
pub struct AppState {
    /// Query pipeline
    pub engine: Arc<SearchEngine>,

    /// Store handle for the health check
    pub store: Arc<dyn VectorStore>,
}

impl AppState {
    /// Create a new AppState from a search engine and its store
    pub fn new(engine: SearchEngine, store: Arc<dyn VectorStore>) -> Self {
        Self {
            engine: Arc::new(engine),
            store,
        }
    }
}

/// GET /search?q=<text> - Semantic sentence search
///
/// Responds with a JSON array of `{content, similarity}` (possibly empty).
pub async fn search(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let Query(pairs) = pairs.map_err(|rejection| {
        warn!("Rejected search query string: {}", rejection);
        ApiError::bad_request("Invalid query string")
    })?;
    let params = SearchQuery::from_pairs(pairs);
    let query = params.q.as_deref().unwrap_or_default();

    let results = state.engine.search(query).await?;

    debug!("Search returned {} results", results.len());
    Ok(Json(results))
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let sentences = state.store.count().await.map_err(|e| {
        warn!("Health check could not count sentences: {}", e);
        ApiError::unavailable("Vector store unavailable")
    })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "service": "leserve",
        "version": env!("CARGO_PKG_VERSION"),
        "sentences": sentences,
    })))
}

/// Create router with all API endpoints
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search))
}
