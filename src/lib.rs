//! # iqair_exporter - Prometheus exporter for IQAir AirVisual monitors
//!
//! Scrapes the JSON status endpoint of an AirVisual Pro (or compatible)
//! air quality monitor on every Prometheus scrape and republishes the
//! readings as metrics.
//!
//! ## Metrics
//!
//! - `iqair_up` - whether the last scrape of the device succeeded
//! - `iqair_co2`, `iqair_p25`, `iqair_p10` - CO2 and particulate readings
//! - `iqair_temperature` - temperature in Celsius
//! - `iqair_humidity` - relative humidity
//! - `iqair_exporter_scrapes_total` - scrape attempts
//! - `iqair_exporter_json_parse_failures_total` - undecodable device responses
//! - `iqair_exporter_build_info` - exporter version
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iqair_exporter::{start_web_server, IqAirCollector, WebConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collector = IqAirCollector::new("http://192.168.1.20/status", Duration::from_secs(10))?;
//!     start_web_server(WebConfig::default(), Arc::new(collector)).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod metrics;
pub mod web;

// Re-export public API
pub use error::{ExporterError, Result};
pub use metrics::{
    build_info::BuildInfo,
    collector::IqAirCollector,
    data::{ApiResponse, Reading},
    traits::PullCollector,
};

pub use web::{create_app, start_web_server, WebConfig};

/// Namespace prefix for every exported metric
pub const NAMESPACE: &str = "iqair";

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 9861;

/// The default path metrics are served under
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// The default upstream request timeout in seconds
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 10;
