use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsdesk_api::cache::{CacheGateway, RedisBackend};
use newsdesk_api::config::AppConfig;
use newsdesk_api::database::DatabaseManager;
use newsdesk_api::server::{bind_with_fallback, serve};
use newsdesk_api::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "newsdesk-api", version, about = "News CMS REST API server")]
struct Args {
    /// Port to listen on (overrides PORT / APP_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Dotenv file to load instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // a missing .env is fine
    match &args.env_file {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("newsdesk_api=info,tower_http=info")),
        )
        .init();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting newsdesk API in {:?} mode", config.environment);

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let ttl = Duration::from_secs(config.cache.ttl_secs);
    let cache = match &config.cache.redis_url {
        Some(url) => {
            let backend = RedisBackend::new(url, &config.cache).context("failed to create redis pool")?;
            CacheGateway::new(Arc::new(backend), ttl)
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-memory cache");
            CacheGateway::in_memory(ttl)
        }
    };

    let listener = bind_with_fallback(config.server.port, config.server.port_fallback_attempts)
        .await
        .context("failed to bind a listening port")?;

    let state = AppState::new(config, db.clone(), cache);
    serve(listener, state).await.context("server error")?;

    db.close().await;
    tracing::info!("database pool closed");
    Ok(())
}
