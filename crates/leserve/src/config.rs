//! Server configuration from TOML or environment

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use leplongement::{OllamaConfig, DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_HOST};
use lerecherche::{SearchConfig, DEFAULT_TOP_K};
use levecteur::{StorageConfig, DEFAULT_DIMENSION};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default host address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port number
pub const DEFAULT_PORT: u16 = 8081;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Slack between the embedding timeout and the whole-request deadline
const REQUEST_DEADLINE_GRACE: Duration = Duration::from_secs(1);

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "LESENS_CONFIG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ServerConfig`]
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// A value is missing or out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
///
/// Every field has a default, so a partial TOML file is fine. The database
/// location has no usable default and must come from the file or
/// `DATABASE_URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite database location (`sqlite://` prefix optional)
    pub database_url: String,

    /// Ollama server address
    pub ollama_host: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Dimension of the model's embeddings
    pub embedding_dimension: usize,

    /// Maximum results per search
    pub top_k: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Log level for tracing
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: String::new(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_DIMENSION,
            top_k: DEFAULT_TOP_K,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` or `ConfigError::Parse`
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Full startup load: optional `LESENS_CONFIG` file, then the environment
    ///
    /// Environment variables:
    /// - `LESENS_HOST` - Server host
    /// - `LESENS_PORT` - Server port
    /// - `DATABASE_URL` - SQLite database location
    /// - `OLLAMA_HOST` - Ollama server address
    /// - `LESENS_EMBEDDING_MODEL` - Embedding model
    /// - `LESENS_EMBEDDING_DIMENSION` - Embedding dimension
    /// - `LESENS_TOP_K` - Results per search
    /// - `LESENS_REQUEST_TIMEOUT_SECS` - Request timeout
    /// - `LESENS_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
    ///
    /// # Errors
    ///
    /// Fails if the named file cannot be read or parsed. Validation is left
    /// to the caller.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`ServerConfig::load`] with an injectable variable lookup
    ///
    /// # Errors
    ///
    /// Fails if the named file cannot be read or parsed
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("LESENS_HOST") {
            self.host = host;
        }
        if let Some(port) = get("LESENS_PORT").and_then(|v| v.trim().parse().ok()) {
            self.port = port;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(host) = get("OLLAMA_HOST") {
            self.ollama_host = host;
        }
        if let Some(model) = get("LESENS_EMBEDDING_MODEL") {
            self.embedding_model = model;
        }
        if let Some(dim) = get("LESENS_EMBEDDING_DIMENSION").and_then(|v| v.trim().parse().ok()) {
            self.embedding_dimension = dim;
        }
        if let Some(top_k) = get("LESENS_TOP_K").and_then(|v| v.trim().parse().ok()) {
            self.top_k = top_k;
        }
        if let Some(secs) = get("LESENS_REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(level) = get("LESENS_LOG_LEVEL") {
            self.log_level = level.trim().to_lowercase();
        }
    }

    /// Get the socket address for the server
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if host and port do not form a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid address: {}", e)))
    }

    /// Get the full server URL
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Whole-request deadline enforced by the router
    ///
    /// Longer than the embedding timeout, so a slow provider is reported as
    /// an embedding failure before the request itself is cut off.
    #[must_use]
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs) + REQUEST_DEADLINE_GRACE
    }

    /// SQLite file path derived from `database_url`
    #[must_use]
    pub fn database_path(&self) -> &str {
        let url = self.database_url.trim();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }

    /// Vector store settings
    #[must_use]
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(self.database_path(), self.embedding_dimension)
    }

    /// Embedding provider settings
    ///
    /// The provider gets the same timeout as the whole request.
    #[must_use]
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            host: self.ollama_host.clone(),
            model: self.embedding_model.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    /// Search engine settings
    #[must_use]
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig { top_k: self.top_k }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("Host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid("Port cannot be zero".to_string()));
        }

        if self.database_path().is_empty() {
            return Err(ConfigError::Invalid(
                "DATABASE_URL must be set to a SQLite database path".to_string(),
            ));
        }

        if self.ollama_host.trim().is_empty() {
            return Err(ConfigError::Invalid("Ollama host cannot be empty".to_string()));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::Invalid("Embedding model cannot be empty".to_string()));
        }

        if self.embedding_dimension == 0 {
            return Err(ConfigError::Invalid(
                "Embedding dimension must be greater than zero".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be greater than zero".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
