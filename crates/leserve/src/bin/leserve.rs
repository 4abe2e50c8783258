//! leserve binary entry point

use anyhow::Context;
use leserve::{LeServeServer, ServerConfig};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment
    let dotenv = dotenvy::dotenv();

    let config = ServerConfig::load().context("Failed to load configuration")?;
    leserve::init_tracing(&config.log_level);

    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }

    info!("LeServe - LeSens semantic search server");
    info!("Configuration:");
    info!("  Address: {}", config.server_url());
    info!("  Database: {}", config.database_path());
    info!("  Ollama: {} (model {})", config.ollama_host, config.embedding_model);

    let server = LeServeServer::bootstrap(config)
        .await
        .context("Failed to start server")?;

    server.seed().await;

    server.start().await.context("Server error")?;

    Ok(())
}
