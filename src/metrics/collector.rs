//! Scrape-on-demand collector for a single AirVisual monitor.

use crate::error::{ExporterError, Result};
use crate::metrics::{
    data::{ApiResponse, Reading},
    traits::PullCollector,
};
use crate::NAMESPACE;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntCounter, Opts};
use reqwest::{Client, Url};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

fn gauge(name: &str, help: &str) -> Result<Gauge> {
    Ok(Gauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?)
}

fn counter(name: &str, help: &str) -> Result<IntCounter> {
    Ok(IntCounter::with_opts(
        Opts::new(name, help).namespace(NAMESPACE),
    )?)
}

/// Collects air quality readings from one monitor's JSON endpoint.
///
/// Each call to [`PullCollector::collect`] performs exactly one upstream
/// GET. Overlapping calls queue on an internal lock, so at most one scrape
/// is in flight per collector.
pub struct IqAirCollector {
    uri: Url,
    client: Client,
    scrape_lock: Mutex<()>,

    up: Gauge,
    co2: Gauge,
    p25: Gauge,
    p10: Gauge,
    temperature: Gauge,
    humidity: Gauge,

    total_scrapes: IntCounter,
    json_parse_failures: IntCounter,
}

impl IqAirCollector {
    /// Create a collector for `uri`, bounding every upstream request by `timeout`.
    pub fn new(uri: &str, timeout: Duration) -> Result<Self> {
        let uri = parse_scrape_uri(uri)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExporterError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            uri,
            client,
            scrape_lock: Mutex::new(()),
            up: gauge("up", "Was the last scrape of iqAir successful.")?,
            co2: gauge("co2", "CO2 reading.")?,
            p25: gauge("p25", "p2.5 particulate reading.")?,
            p10: gauge("p10", "p10 particulate reading.")?,
            temperature: gauge("temperature", "Temperature reading in Celsius.")?,
            humidity: gauge("humidity", "Humidity reading.")?,
            total_scrapes: counter("exporter_scrapes_total", "Current total iqAir scrapes.")?,
            json_parse_failures: counter(
                "exporter_json_parse_failures_total",
                "Number of errors while parsing JSON.",
            )?,
        })
    }

    /// The upstream URI this collector scrapes.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Number of scrape attempts since construction.
    pub fn scrapes_total(&self) -> u64 {
        self.total_scrapes.get()
    }

    /// Number of upstream bodies that failed to decode.
    pub fn json_parse_failures_total(&self) -> u64 {
        self.json_parse_failures.get()
    }

    /// Fetch and decode one reading without touching any counters.
    pub async fn fetch_reading(&self) -> Result<Reading> {
        let body = self.fetch().await?;
        Ok(ApiResponse::from_slice(&body)?.current)
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self.client.get(self.uri.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::UpstreamStatus(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// One scrape attempt. Failures are logged and reported as `None`.
    async fn scrape(&self) -> Option<Reading> {
        self.total_scrapes.inc();

        match self.fetch_reading().await {
            Ok(reading) => {
                debug!(uri = %self.uri, ?reading, "scraped upstream");
                Some(reading)
            }
            Err(err) if err.is_decode() => {
                self.json_parse_failures.inc();
                warn!(uri = %self.uri, error = %err, "failed to parse upstream body");
                None
            }
            Err(err) => {
                warn!(uri = %self.uri, error = %err, "failed to scrape upstream");
                None
            }
        }
    }

    fn publish(&self, reading: Option<Reading>) {
        self.up.set(if reading.is_some() { 1.0 } else { 0.0 });

        let reading = reading.unwrap_or_default();
        self.co2.set(reading.co2 as f64);
        self.p25.set(reading.p25 as f64);
        self.p10.set(reading.p10 as f64);
        self.temperature.set(reading.temperature);
        self.humidity.set(reading.humidity as f64);
    }

    fn metrics(&self) -> [&dyn Collector; 8] {
        [
            &self.total_scrapes,
            &self.json_parse_failures,
            &self.up,
            &self.co2,
            &self.p25,
            &self.p10,
            &self.temperature,
            &self.humidity,
        ]
    }
}

impl PullCollector for IqAirCollector {
    fn describe(&self) -> Vec<Desc> {
        self.metrics()
            .into_iter()
            .flat_map(|metric| metric.desc().into_iter().cloned())
            .collect()
    }

    async fn collect(&self) -> Vec<MetricFamily> {
        let _guard = self.scrape_lock.lock().await;

        let reading = self.scrape().await;
        self.publish(reading);

        self.metrics()
            .into_iter()
            .flat_map(|metric| metric.collect())
            .collect()
    }
}

fn parse_scrape_uri(uri: &str) -> Result<Url> {
    if uri.trim().is_empty() {
        return Err(ExporterError::config_error("Scrape URI must not be empty"));
    }

    let url = Url::parse(uri)
        .map_err(|e| ExporterError::config_error(format!("Invalid scrape URI {:?}: {}", uri, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ExporterError::config_error(format!(
            "Unsupported scrape URI scheme: {}",
            scheme
        ))),
    }
}
