//! HTTP client for the ledger gateway.
//!
//! This module provides a type-safe HTTP client for the gateway that
//! fronts the payment ledger contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use drip_sdk::client::GatewayClient;
//! use drip_sdk::Ledger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::with_base_url("http://localhost:8545")?;
//!
//!     let count = client.payment_count().await?;
//!     println!("ledger tracks {} payments", count);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::GatewayClient;
