//! Web application router and middleware setup.

use crate::error::Result;
use crate::metrics::{BuildInfo, PullCollector};
use crate::web::config::WebConfig;
use crate::web::handlers::{self, AppState};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the axum application serving metrics from `collector`.
pub fn create_app<C>(config: &WebConfig, collector: Arc<C>) -> Result<Router>
where
    C: PullCollector + Send + Sync + 'static,
{
    config.validate()?;

    let state = AppState {
        collector,
        build_info: Arc::new(BuildInfo::new()?),
        landing_page: handlers::landing_page(&config.metrics_path).into(),
    };

    let app = Router::new()
        .route(&config.metrics_path, get(handlers::metrics::<C>))
        .route("/", get(handlers::index::<C>))
        .route("/-/healthy", get(handlers::health_check))
        .fallback(handlers::index::<C>)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    Ok(app)
}
