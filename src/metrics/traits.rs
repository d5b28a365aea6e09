//! Traits for pull-based metrics collection.

use prometheus::core::Desc;
use prometheus::proto::MetricFamily;

/// A source of metrics that is scraped on demand.
///
/// Mirrors the describe/collect split of a Prometheus collector, with an
/// async `collect` so implementations can perform network I/O on the
/// scrape path.
pub trait PullCollector {
    /// Every metric descriptor this collector can ever emit.
    ///
    /// Must not perform I/O or block.
    fn describe(&self) -> Vec<Desc>;

    /// Perform one scrape and return the resulting metric families.
    fn collect(&self) -> impl std::future::Future<Output = Vec<MetricFamily>> + Send;
}
