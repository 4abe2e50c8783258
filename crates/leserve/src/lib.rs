//! leserve - HTTP Server
//!
//! *Le Serve* (The Server) - Axum-based HTTP server for LeSens semantic search

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

use tracing_subscriber::EnvFilter;

/// API error types
pub mod error;

/// HTTP handlers for REST endpoints
pub mod handlers;

/// Server configuration from TOML and environment
pub mod config;

/// Server instance management
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use server::{LeServeServer, StartupError};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `level`. Output goes to stderr. Calling
/// this twice keeps the first subscriber.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
