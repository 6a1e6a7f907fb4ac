// =============================================================================
// Meridian Signal API — Main Entry Point
// =============================================================================
//
// Loads configuration (falling back to defaults with a warning), builds the
// shared state, and serves the REST API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod binance;
mod cache;
mod candle_source;
mod config;
mod engine;
mod indicators;
mod subscription;
mod types;

use std::sync::Arc;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::AppConfig;

const CONFIG_PATH: &str = "meridian_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Meridian Signal API starting up");

    let mut config = match AppConfig::load(CONFIG_PATH) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            let cfg = AppConfig::default();
            // Bootstrap a starter config so operators have a file to edit.
            if let Err(e) = cfg.save(CONFIG_PATH) {
                warn!(error = %e, "failed to write starter config");
            }
            cfg
        }
    };
    config.apply_env_overrides();

    info!(
        symbols = ?config.symbols,
        subscribers = config.subscribers.len(),
        cache_ttl_secs = config.cache_ttl_secs,
        "configuration resolved"
    );
    if config.subscribers.is_empty() {
        warn!("no subscribers configured — authenticated endpoints will reject every request");
    }

    // ── 2. Shared state & router ─────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));
    let app = api::rest::router(state.clone());

    // ── 3. Cache sweep loop ──────────────────────────────────────────────
    let sweep_source = state.candle_source.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            sweep_source.purge_expired();
            debug!(cached_series = sweep_source.cached_series(), "candle cache swept");
        }
    });

    // ── 4. Serve until shutdown ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind_addr}: {e}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Meridian Signal API shut down complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    warn!("shutdown signal received — stopping gracefully");
}
