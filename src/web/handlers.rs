//! HTTP handlers for the exposition endpoints.

use crate::metrics::{BuildInfo, PullCollector};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tracing::error;

/// Shared state handed to every handler.
pub struct AppState<C> {
    pub collector: Arc<C>,
    pub build_info: Arc<BuildInfo>,
    pub landing_page: Arc<str>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            collector: Arc::clone(&self.collector),
            build_info: Arc::clone(&self.build_info),
            landing_page: Arc::clone(&self.landing_page),
        }
    }
}

/// Scrape the device and render all metrics in the text exposition format.
///
/// Upstream failures are already folded into the metrics, so this only
/// errors if encoding itself fails.
pub async fn metrics<C>(State(state): State<AppState<C>>) -> Response
where
    C: PullCollector + Send + Sync + 'static,
{
    let mut families = state.collector.collect().await;
    families.extend(state.build_info.gather());

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Landing page linking to the metrics path.
pub async fn index<C>(State(state): State<AppState<C>>) -> Html<String>
where
    C: Send + Sync + 'static,
{
    Html(state.landing_page.to_string())
}

/// Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Render the landing page for a given metrics path.
pub fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>
<head><title>iqAir Exporter</title></head>
<body>
<h1>iqAir Exporter</h1>
<p><a href='{}'>Metrics</a></p>
</body>
</html>
",
        metrics_path
    )
}
