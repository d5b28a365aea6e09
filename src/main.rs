//! iqair_exporter binary
//!
//! Exposes the readings of one AirVisual monitor as Prometheus metrics.

use anyhow::Context;
use clap::{Parser, Subcommand};
use iqair_exporter::{
    start_web_server, IqAirCollector, WebConfig, DEFAULT_METRICS_PATH, DEFAULT_SCRAPE_TIMEOUT_SECS,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "iqair_exporter")]
#[command(about = "Prometheus exporter for IQAir AirVisual air quality monitors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address", default_value = ":9861")]
    listen_address: String,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path", default_value = DEFAULT_METRICS_PATH)]
    metrics_path: String,

    /// URI on which to scrape iqAir
    #[arg(long = "iqair.scrape-uri")]
    scrape_uri: String,

    /// Timeout in seconds for each request to the device
    #[arg(long = "iqair.timeout", default_value_t = DEFAULT_SCRAPE_TIMEOUT_SECS)]
    timeout: u64,

    /// Only log messages with the given severity or above
    #[arg(long = "log.level", default_value = "info")]
    log_level: Level,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the device once, print the reading as JSON, and exit
    Probe,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(err) = run(cli).await {
        error!(error = %format!("{:#}", err), "iqair_exporter failed");
        std::process::exit(1);
    }
}

fn init_logging(level: Level) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(cli.timeout);
    let collector = IqAirCollector::new(&cli.scrape_uri, timeout)
        .context("Error creating an exporter")?;

    match cli.command {
        Some(Commands::Probe) => probe_command(&collector).await,
        None => serve_command(&cli, collector).await,
    }
}

async fn serve_command(cli: &Cli, collector: IqAirCollector) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting iqair_exporter");
    info!(uri = %collector.uri(), timeout_secs = cli.timeout, "Scraping device");

    let web_config = WebConfig::from_listen_address(&cli.listen_address)?
        .with_metrics_path(cli.metrics_path.as_str());

    start_web_server(web_config, Arc::new(collector))
        .await
        .context("Error starting HTTP server")?;

    Ok(())
}

async fn probe_command(collector: &IqAirCollector) -> anyhow::Result<()> {
    let reading = collector
        .fetch_reading()
        .await
        .with_context(|| format!("Failed to scrape {}", collector.uri()))?;

    println!("{}", serde_json::to_string_pretty(&reading)?);
    Ok(())
}
