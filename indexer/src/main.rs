//! Drip Indexer binary.
//!
//! Runs one indexing pass against the configured ledger gateway and
//! prints the resulting history view as JSON.

use std::env;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drip_indexer::{HistoryIndexer, IndexerConfig};
use drip_sdk::{Address, GatewayClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,drip_indexer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let gateway_url =
        env::var("LEDGER_GATEWAY_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());
    let start_block: u64 = env::var("START_BLOCK")
        .unwrap_or_else(|_| "0".to_string())
        .parse()?;
    let owner = match env::var("OWNER_FILTER") {
        Ok(s) => Some(Address::from_hex(&s)?),
        Err(_) => None,
    };

    tracing::info!("Starting Drip Indexer");
    tracing::info!("Ledger gateway URL: {}", gateway_url);
    tracing::info!("Start block: {}", start_block);

    let client = GatewayClient::with_base_url(gateway_url)?;
    let indexer = HistoryIndexer::new(
        Arc::new(client),
        IndexerConfig::with_start_block(start_block),
    )?;

    let view = indexer.index(owner).await;
    if let Some(ref error) = view.error {
        tracing::error!("index run failed: {}", error);
    }

    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
