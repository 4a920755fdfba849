//! nfz-queues server entry point.
//!
//! Boots the HTTP endpoint in front of the NFZ queue directory.
//! Logs are emitted as JSON on stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use nfzq_client::{GoogleGeocoder, NfzClient, NfzConfig};
use nfzq_core::{AppConfig, CacheDb, CachingGeocoder, Geocoder, HardcodedGeocoder};
use tracing_subscriber::EnvFilter;

mod api;
mod error;
mod service;
#[cfg(test)]
mod test_support;

use service::QueuesService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(db_path = %config.db_path.display(), bind_addr = %config.bind_addr, "starting nfz-queues");

    let db = CacheDb::open(&config.db_path).await.context("failed to open cache database")?;
    let source = NfzClient::new(NfzConfig::from(&config)).context("failed to build NFZ client")?;

    let geocoder: Arc<dyn Geocoder> = match config.google_api_key() {
        Some(key) => {
            tracing::info!("using google geocoder");
            Arc::new(CachingGeocoder::new(GoogleGeocoder::new(key)?, db.clone()))
        }
        None => Arc::new(HardcodedGeocoder),
    };

    let app = api::router(QueuesService::new(db.clone(), Arc::new(source), geocoder));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("shutting down");
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
