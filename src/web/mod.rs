//! Metrics exposition server.
//!
//! Serves the Prometheus text format on the configured metrics path, a small
//! landing page at `/`, and a liveness probe at `/-/healthy`.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::{WebConfig, ANY_HOST};
pub use router::create_app;

use crate::error::{ExporterError, Result};
use crate::metrics::PullCollector;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Start the web server with the provided configuration and collector.
///
/// Runs until the process receives Ctrl-C.
pub async fn start_web_server<C>(config: WebConfig, collector: Arc<C>) -> Result<()>
where
    C: PullCollector + Send + Sync + 'static,
{
    let app = create_app(&config, collector)?;

    let listener = bind_listener(&config).await?;

    let addr = listener.local_addr()?;
    info!(address = %addr, metrics_path = %config.metrics_path, "Listening on address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Server error: {}", e)))?;

    info!("Web server stopped");
    Ok(())
}

/// Bind the listening socket for `config`.
///
/// A wildcard IPv6 host falls back to `0.0.0.0` on hosts without IPv6.
pub async fn bind_listener(config: &WebConfig) -> Result<TcpListener> {
    match TcpListener::bind(config.bind_address()).await {
        Ok(listener) => Ok(listener),
        Err(e) if config.host == ANY_HOST => {
            warn!(error = %e, "IPv6 wildcard bind failed, listening on IPv4 only");
            TcpListener::bind(("0.0.0.0", config.port))
                .await
                .map_err(|e| ExporterError::web_server_error(format!("Failed to bind to address: {}", e)))
        }
        Err(e) => Err(ExporterError::web_server_error(format!(
            "Failed to bind to address: {}",
            e
        ))),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
