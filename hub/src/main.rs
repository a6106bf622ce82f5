mod auth;
mod config;
mod db;
mod error;
mod routes;
mod series;
mod state;
mod transform;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use db::pool::open_ro_pool;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env next to the binary's working directory.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::from_env()?;
    let addr: SocketAddr = cfg
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", cfg.bind_addr()))?;

    let pool = open_ro_pool(&cfg.db_path, cfg.pool_size)?;
    if cfg.token.is_empty() {
        tracing::warn!("STOCK_HUB_TOKEN not set, API is unauthenticated");
    }

    let app = routes::app(AppState::new(cfg, pool));

    tracing::info!("stock-hub listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("stock-hub stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully stopping…");
}
