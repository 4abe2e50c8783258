//! Embedding generation through a local or remote Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use ollama_rs::Ollama;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::provider::{Embedding, EmbeddingProvider};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";

/// Port assumed when `OLLAMA_HOST` names a plain-http host without one
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "mxbai-embed-large";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Server address, `[scheme://]host[:port]`
    pub host: String,

    /// Embedding model name
    pub model: String,

    /// Upper bound on a single embedding request, in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    /// Create a config for `host` using `model`
    #[must_use]
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Resolve the configured host into a base URL and port
    ///
    /// Follows the Ollama client convention: the scheme defaults to `http`,
    /// the port to 11434 for `http` and 443 for `https`.
    ///
    /// # Returns
    ///
    /// `Err(EmbeddingError::Config)` if the host is empty or unparsable
    pub fn endpoint(&self) -> Result<(String, u16)> {
        parse_host(&self.host)
    }
}

fn parse_host(host: &str) -> Result<(String, u16)> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(EmbeddingError::Config("Ollama host cannot be empty".to_string()));
    }

    let uri: http::Uri = trimmed
        .parse()
        .map_err(|e| EmbeddingError::Config(format!("Invalid Ollama host '{}': {}", host, e)))?;

    let scheme = uri.scheme_str().unwrap_or("http");
    let default_port = match scheme {
        "http" => DEFAULT_OLLAMA_PORT,
        "https" => 443,
        other => {
            return Err(EmbeddingError::Config(format!(
                "Unsupported Ollama scheme '{}'",
                other
            )))
        }
    };

    let hostname = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| EmbeddingError::Config(format!("Ollama host '{}' has no hostname", host)))?;

    Ok((
        format!("{}://{}", scheme, hostname),
        uri.port_u16().unwrap_or(default_port),
    ))
}

/// Whether an installed model name (`name[:tag]`) satisfies the configured one
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || (!wanted.contains(':') && installed.split(':').next() == Some(wanted))
}

/// Ollama embedding client
pub struct OllamaEmbedder {
    ollama: Ollama,
    model: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    /// Build a client from configuration
    ///
    /// No request is made here; an unreachable server only shows up on the
    /// first call.
    ///
    /// # Errors
    /// Returns `EmbeddingError::Config` for an empty model or a bad host
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::Config(
                "Embedding model cannot be empty".to_string(),
            ));
        }

        let (host, port) = config.endpoint()?;
        debug!("Ollama endpoint {}:{} (model {})", host, port, config.model);

        let url = format!("{}:{}", host, port);
        let ollama = Ollama::try_new(url.as_str())
            .map_err(|e| EmbeddingError::Config(format!("Invalid Ollama URL '{}': {}", url, e)))?;

        Ok(Self {
            ollama,
            model: config.model,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }

    /// Check whether the configured model is installed on the server
    ///
    /// # Errors
    /// Returns an error if Ollama cannot be reached
    pub async fn model_available(&self) -> Result<bool> {
        let models = self.ollama.list_local_models().await.map_err(|error| {
            EmbeddingError::Request(format!("Failed to connect to Ollama: {}", error))
        })?;

        Ok(models
            .iter()
            .any(|model| model_matches(&model.name, &self.model)))
    }

    fn classify_error(&self, error: impl std::fmt::Debug + std::fmt::Display) -> EmbeddingError {
        let detail = format!("{:?}", error);
        if detail.contains("model") && detail.contains("not found") {
            EmbeddingError::ModelNotFound(self.model.clone())
        } else {
            EmbeddingError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), text.to_string().into());

        let response = tokio::time::timeout(self.timeout, self.ollama.generate_embeddings(request))
            .await
            .map_err(|_| EmbeddingError::Timeout(self.timeout.as_secs()))?
            .map_err(|error| self.classify_error(error))?;

        // Ollama returns Vec<Vec<f32>>, we want the first embedding
        response
            .embeddings
            .into_iter()
            .next()
            .filter(|embedding| !embedding.is_empty())
            .ok_or(EmbeddingError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_ollama_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://127.0.0.1:11434");
        assert_eq!(config.model, "mxbai-embed-large");
        assert_eq!(config.timeout_secs, 30);
    }

    #[rstest]
    #[case("http://127.0.0.1:11434", "http://127.0.0.1", 11434)]
    #[case("http://localhost:11434/", "http://localhost", 11434)]
    #[case("127.0.0.1:9000", "http://127.0.0.1", 9000)]
    #[case("http://ollama.internal", "http://ollama.internal", 11434)]
    #[case("https://ollama.example.com", "https://ollama.example.com", 443)]
    #[case("  http://0.0.0.0:11434  ", "http://0.0.0.0", 11434)]
    fn test_endpoint_parsing(#[case] host: &str, #[case] base: &str, #[case] port: u16) {
        let config = OllamaConfig::new(host, DEFAULT_EMBEDDING_MODEL);
        let (parsed_base, parsed_port) = config.endpoint().unwrap();
        assert_eq!(parsed_base, base);
        assert_eq!(parsed_port, port);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("ftp://ollama.example.com")]
    fn test_endpoint_rejects_bad_hosts(#[case] host: &str) {
        let config = OllamaConfig::new(host, DEFAULT_EMBEDDING_MODEL);
        assert!(matches!(config.endpoint(), Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_embedder_rejects_empty_model() {
        let result = OllamaEmbedder::new(OllamaConfig::new(DEFAULT_OLLAMA_HOST, " "));
        assert!(matches!(result, Err(EmbeddingError::Config(_))));
    }

    #[test]
    fn test_embedder_keeps_model_name() {
        let embedder = OllamaEmbedder::new(OllamaConfig::default()).unwrap();
        assert_eq!(embedder.model(), "mxbai-embed-large");
    }

    #[rstest]
    #[case("http://127.0.0.1:11434")]
    #[case("127.0.0.1:9000")]
    #[case("https://ollama.example.com")]
    fn test_embedder_builds_client_for_valid_hosts(#[case] host: &str) {
        let embedder = OllamaEmbedder::new(OllamaConfig::new(host, DEFAULT_EMBEDDING_MODEL));
        assert!(embedder.is_ok());
    }

    #[rstest]
    #[case("mxbai-embed-large:latest", "mxbai-embed-large", true)]
    #[case("mxbai-embed-large", "mxbai-embed-large", true)]
    #[case("mxbai-embed-large:v1", "mxbai-embed-large:latest", false)]
    #[case("nomic-embed-text:latest", "mxbai-embed-large", false)]
    fn test_model_matches(#[case] installed: &str, #[case] wanted: &str, #[case] expected: bool) {
        assert_eq!(model_matches(installed, wanted), expected);
    }
}
