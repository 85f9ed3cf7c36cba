//! quota_cache - caching, rate-limited proxy for GitHub and Jira

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quota_cache::api::{create_router, AppState};
use quota_cache::config::Config;
use quota_cache::tasks::{CleanupScheduler, SweepIntervals};
use quota_cache::upstream::HttpUpstream;

/// Main entry point for the proxy server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream client, cache and rate limiter
/// 4. Start the background cleanup sweeps
/// 5. Serve until SIGINT/SIGTERM, then cancel the sweeps
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quota_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting quota_cache proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, port={}, cache_sweep={}s, rate_limit_sweep={}s, jira_configured={}",
        config.default_ttl,
        config.server_port,
        config.cache_sweep_interval,
        config.rate_limit_sweep_interval,
        config.upstream.jira_base_url.is_some()
    );

    let upstream = HttpUpstream::new(config.upstream.clone())
        .context("failed to build upstream HTTP client")?;
    let state = AppState::from_config(&config, Arc::new(upstream));

    let scheduler = CleanupScheduler::start(
        state.cache.clone(),
        state.limiter.clone(),
        SweepIntervals::from_config(&config),
    );
    info!("Background cleanup sweeps started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    scheduler.shutdown();
    warn!("Cleanup sweeps aborted");
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
