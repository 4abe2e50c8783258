//! Server instance management

use std::net::SocketAddr;
use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::{BoxError, Router};
use leplongement::{EmbeddingError, EmbeddingProvider, OllamaEmbedder};
use lerecherche::{CorpusSeeder, SearchEngine, SeedOutcome};
use levecteur::{SqliteVectorStore, StoreError, VectorStore};
use thiserror::Error;
use tokio::signal;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::error::ApiError;
use crate::handlers::{create_router, AppState};

/// Failures that stop the server from starting
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The vector store could not be opened
    #[error("Could not open vector store: {0}")]
    Store(#[from] StoreError),

    /// The embedding client could not be built
    #[error("Could not create embedding client: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Binding or serving failed
    #[error("Server I/O error on {addr}: {source}")]
    Io {
        /// Listen address
        addr: SocketAddr,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// LeServe HTTP server
///
/// Owns the two collaborators and hands them to the seeder and the search
/// engine; nothing is reached through globals.
pub struct LeServeServer {
    config: ServerConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl LeServeServer {
    /// Build the production server: SQLite store and Ollama embedder
    ///
    /// Store and client construction failures are fatal. A missing model is
    /// only logged; the first embedding call will report it.
    ///
    /// # Errors
    ///
    /// `StartupError::Config`, `StartupError::Store` or `StartupError::Embedding`
    pub async fn bootstrap(config: ServerConfig) -> Result<Self, StartupError> {
        config.validate()?;

        let store = SqliteVectorStore::open_with_config(config.storage_config()).map_err(|e| {
            error!("Could not connect to database: {}", e);
            e
        })?;
        info!(
            "Vector store ready at {} (dimension {})",
            config.database_path(),
            store.dimension()
        );

        let embedder = OllamaEmbedder::new(config.ollama_config()).map_err(|e| {
            error!("Could not create Ollama client: {}", e);
            e
        })?;

        match embedder.model_available().await {
            Ok(true) => info!("Embedding model '{}' is available", config.embedding_model),
            Ok(false) => warn!(
                "Embedding model '{}' is not installed; run `ollama pull {}`",
                config.embedding_model, config.embedding_model
            ),
            Err(e) => warn!("Could not check embedding model: {}", e),
        }

        Ok(Self::from_parts(config, Arc::new(embedder), Arc::new(store)))
    }

    /// Assemble a server from already-built collaborators
    pub fn from_parts(
        config: ServerConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
        }
    }

    /// Seed the store if empty
    ///
    /// Never fails: a failed count check is logged and the server carries on
    /// with whatever the store holds.
    pub async fn seed(&self) -> Option<SeedOutcome> {
        let seeder = CorpusSeeder::new(Arc::clone(&self.embedder), Arc::clone(&self.store));
        match seeder.seed().await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Skipping database seeding: {}", e);
                None
            }
        }
    }

    /// Router with state and middleware applied
    pub fn router(&self) -> Router {
        let engine = SearchEngine::with_config(
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
            self.config.search_config(),
        );
        let state = AppState::new(engine, Arc::clone(&self.store));

        create_router()
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(self.config.request_deadline())),
            )
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http())
    }

    /// Get socket address for binding
    ///
    /// # Errors
    ///
    /// `StartupError::Config` if the host is not an IP address
    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        Ok(self.config.socket_addr()?)
    }

    /// Get server URL
    #[must_use]
    pub fn server_url(&self) -> String {
        self.config.server_url()
    }

    /// Bind and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// `StartupError::Io` if binding or serving fails
    pub async fn start(&self) -> Result<(), StartupError> {
        let addr = self.socket_addr()?;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|source| {
            error!("Failed to bind to {}: {:?}", addr, source);
            StartupError::Io { addr, source }
        })?;

        info!("Server listening on: {}", self.server_url());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|source| StartupError::Io { addr, source })?;

        info!("Server stopped");
        Ok(())
    }
}

/// Turn a middleware failure into a JSON error
///
/// An expired deadline drops the handler future along with any pending
/// embedding or store call.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        warn!("Request exceeded its deadline; in-flight search cancelled");
        ApiError::unavailable("Request timed out")
    } else {
        error!("Unhandled middleware error: {}", err);
        ApiError::internal("Internal server error")
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received TERM signal");
            }
            Err(e) => {
                error!("Failed to install TERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
