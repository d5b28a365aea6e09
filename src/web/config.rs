//! Web server configuration.

use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};

/// Host that listens on every interface, dual-stack where the OS allows it.
pub const ANY_HOST: &str = "[::]";

/// Configuration for the metrics exposition server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Host to bind the server to
    pub host: String,
    /// Port to bind the server to
    pub port: u16,
    /// Path under which metrics are exposed
    pub metrics_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: crate::DEFAULT_WEB_PORT,
            metrics_path: crate::DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl WebConfig {
    /// Create a new web configuration with custom host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Build a configuration from a `host:port` listen address.
    ///
    /// An empty host (`:9861`) binds every interface, IPv6 and IPv4.
    pub fn from_listen_address(address: &str) -> Result<Self> {
        let (host, port) = address.rsplit_once(':').ok_or_else(|| {
            ExporterError::config_error(format!("Listen address {:?} is missing a port", address))
        })?;

        let port = port.parse::<u16>().map_err(|e| {
            ExporterError::config_error(format!("Invalid port in listen address {:?}: {}", address, e))
        })?;

        let host = if host.is_empty() { ANY_HOST } else { host };
        Ok(Self::new(host, port))
    }

    /// Set the host for the web server.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port for the web server.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the metrics path.
    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    /// Check the configuration before serving.
    pub fn validate(&self) -> Result<()> {
        if !self.metrics_path.starts_with('/') {
            return Err(ExporterError::config_error(format!(
                "Metrics path must start with '/': {:?}",
                self.metrics_path
            )));
        }
        if self.metrics_path == "/" || self.metrics_path == "/-/healthy" {
            return Err(ExporterError::config_error(format!(
                "Metrics path {:?} collides with a built-in route",
                self.metrics_path
            )));
        }
        Ok(())
    }

    /// Get the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
