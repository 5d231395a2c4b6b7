//! rtt-server: HTTP surface of rttstream.
//!
//! This crate ties the planner and the external-tool layer into a running
//! server. It provides:
//!
//! - Axum routes for the HLS playlist and on-demand MPEG-TS segments
//! - Path confinement to the configured root directory
//! - A non-blocking admission gate bounding concurrent transcodes
//! - Graceful shutdown via signal handling

pub mod admission;
pub mod context;
pub mod error;
pub mod middleware;
pub mod paths;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;

use rtt_core::config::Config;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the rttstream server.
///
/// Discovers tools, detects hardware support, binds the listener and serves
/// until a shutdown signal is received.
pub async fn start(config: Config, root: PathBuf) -> rtt_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| rtt_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::discover(config, &root).await?;
    tracing::info!(
        root = %ctx.resolver.root().display(),
        strategy = %ctx.config.segment.strategy,
        segment_secs = ctx.segment_length_secs(),
        max_transcodes = ctx.admission.limit(),
        "Serving videos"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| rtt_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Listening on {addr}");

    serve(listener, ctx, CancellationToken::new()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Serve `ctx` on `listener` until a signal arrives or `cancel` fires.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(
    listener: tokio::net::TcpListener,
    ctx: AppContext,
    cancel: CancellationToken,
) -> rtt_core::Result<()> {
    let app = router::build_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
        .map_err(|e| rtt_core::Error::Internal(format!("Server error: {e}")))
}

/// Wait for a shutdown signal (SIGINT or SIGTERM) or cancellation.
pub async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
