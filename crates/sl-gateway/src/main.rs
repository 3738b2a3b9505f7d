//! # Support Login Gateway
//!
//! ## Startup Sequence
//!
//! 1. Load `TL_*` configuration from the environment
//! 2. Install the tracing subscriber
//! 3. Build the handshake services (blocking HTTP client, outside the runtime)
//! 4. Verify account credentials against the remote authority
//! 5. Start the tokio runtime and serve until Ctrl+C

use anyhow::{Context, Result};
use sl_gateway::config::debug_requested;
use sl_gateway::{build_router, build_services, load_config};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    init_tracing(debug_requested())?;

    info!("===========================================");
    info!("  Support Login Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = load_config().context("invalid TL_* configuration")?;
    info!(
        bind = %config.bind,
        helpdesk = config.settings.active_helpdesk(),
        api_url = %config.settings.api_url,
        "configuration loaded"
    );

    let services = build_services(&config).context("failed to build handshake services")?;
    services.verify_credentials();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(serve(config.bind, build_router(services.state.clone())))?;

    // The last handles to the blocking HTTP client must drop outside the runtime.
    drop(runtime);
    info!(audit_entries = services.audit.len(), "gateway stopped");
    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

async fn serve(bind: SocketAddr, router: axum::Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(%bind, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}
