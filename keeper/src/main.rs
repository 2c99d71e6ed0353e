//! Drip Keeper binary.
//!
//! Entry point for the keeper service that detects and executes due
//! recurring payments.

use std::env;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drip_keeper::{KeeperConfig, KeeperService};
use drip_sdk::GatewayClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,drip_keeper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let gateway_url =
        env::var("LEDGER_GATEWAY_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());
    let poll_interval: u64 = env::var("POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()?;
    let gas_buffer: u64 = env::var("GAS_BUFFER_PERCENT")
        .unwrap_or_else(|_| "25".to_string())
        .parse()?;

    tracing::info!("Starting Drip Keeper");
    tracing::info!("Ledger gateway URL: {}", gateway_url);
    tracing::info!("Poll interval: {}s", poll_interval);
    tracing::info!("Gas buffer: {}%", gas_buffer);

    let client = GatewayClient::with_base_url(gateway_url)?;
    let config = KeeperConfig::default()
        .with_poll_interval(poll_interval)
        .with_gas_buffer(gas_buffer);

    let service = Arc::new(KeeperService::new(Arc::new(client), config)?);

    let shutdown = Arc::clone(&service);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.stop();
        }
    });

    service.run().await;
    tracing::info!("Shutting down keeper");

    Ok(())
}
