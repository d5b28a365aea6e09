//! Exporter build information metric.

use crate::error::Result;
use crate::NAMESPACE;
use prometheus::proto::MetricFamily;
use prometheus::{IntGaugeVec, Opts, Registry};

/// Holds `iqair_exporter_build_info`, a constant `1` labelled with the
/// exporter version and minimum supported toolchain.
pub struct BuildInfo {
    registry: Registry,
}

impl BuildInfo {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let info = IntGaugeVec::new(
            Opts::new(
                "exporter_build_info",
                "A metric with a constant '1' value labeled by version and rustc from which iqair_exporter was built.",
            )
            .namespace(NAMESPACE),
            &["version", "rustc"],
        )?;
        info.with_label_values(&[env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_RUST_VERSION")])
            .set(1);
        registry.register(Box::new(info))?;

        Ok(Self { registry })
    }

    /// Gather the build info metric families.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_labels() {
        let families = BuildInfo::new().unwrap().gather();
        assert_eq!(families.len(), 1);

        let family = &families[0];
        assert_eq!(family.get_name(), "iqair_exporter_build_info");

        let metric = &family.get_metric()[0];
        assert_eq!(metric.get_gauge().get_value(), 1.0);

        let version = metric
            .get_label()
            .iter()
            .find(|label| label.get_name() == "version")
            .map(|label| label.get_value());
        assert_eq!(version, Some(env!("CARGO_PKG_VERSION")));
    }
}
