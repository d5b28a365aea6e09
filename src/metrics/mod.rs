//! Metrics collection and data structures.
//!
//! This module holds the AirVisual API types, the on-demand collector that
//! turns one device response into Prometheus metrics, and the exporter's
//! build information metric.

pub mod build_info;
pub mod collector;
pub mod data;
pub mod traits;

// Re-export commonly used items
pub use build_info::BuildInfo;
pub use collector::IqAirCollector;
pub use data::{ApiResponse, Reading};
pub use traits::PullCollector;
