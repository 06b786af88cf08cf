//! Process Simulator - synthetic DCS readings for the process monitoring API
//!
//! Every cycle this binary:
//! - Generates temperature, vibration and flow readings
//! - Posts them as one JSON batch to the monitoring endpoint
//! - Prints the values and the counters returned by the server
//! - Sleeps the configured interval (30s by default)

mod config;
mod monitor;
mod readings;
mod report;
mod simulator;

use anyhow::{Context, Result};
use config::SimulatorConfig;
use monitor::MonitorClient;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simulator::Simulator;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    // Logs on stderr, stdout is the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("process_simulator=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Process Simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = SimulatorConfig::load()
        .await
        .context("Failed to load configuration")?;

    let client = MonitorClient::new(config.api_url.clone(), config.request_timeout())
        .context("Failed to create monitor client")?;

    let mut simulator = Simulator::new(
        client,
        config.interval(),
        StdRng::from_entropy(),
        std::io::stdout(),
    );

    simulator
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Simulation failed")?;

    Ok(())
}
