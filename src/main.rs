//! Distiller Service - Main Entry Point
//!
//! Serves dependency-aware distillation of source files over HTTP.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use distiller::api::{self, AppState};
use distiller::types::ServiceConfig;

/// How often finished jobs are swept from the store.
const JOB_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "distiller=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    info!("Starting Distiller Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        enabled = config.distill.enabled,
        max_depth = config.distill.max_depth,
        concurrency = config.distill.index_concurrency,
        "Distillation defaults"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config));

    // Sweep finished jobs
    let job_store = state.job_store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(JOB_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = job_store.write().await.cleanup_old_jobs();
            debug!(removed, "Cleaned up finished jobs");
        }
    });

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
