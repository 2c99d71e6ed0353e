//! Drip SDK - core types and ledger client for the Drip payment services.
//!
//! This crate provides the shared types and the ledger access surface used
//! by the Drip keeper and history indexer. The ledger contract is the
//! system of record for recurring payments; everything here is a read-only
//! view of it, except the execution submission.
//!
//! # Core Types
//!
//! - [`Address`], [`TxHash`] — hex-rendered identifier wrappers
//! - [`TokenKind`] — native coin vs fungible token
//! - [`ScheduledPaymentSnapshot`] — current ledger truth for one payment
//! - [`RawEvent`], [`RawEventKind`] — one ledger log entry
//! - [`ExecuteCall`], [`Receipt`] — the single write path
//!
//! # Ledger Access
//!
//! - [`Ledger`] — the query/submit trait the services are generic over
//! - [`client::GatewayClient`] — HTTP implementation against the gateway

pub mod client;
pub mod error;
pub mod ledger;
pub mod types;

pub use client::{ClientConfig, ClientError, GatewayClient};
pub use error::SdkError;
pub use ledger::Ledger;
pub use types::{
    Address, ExecuteCall, RawEvent, RawEventKind, Receipt, ScheduledPaymentSnapshot, TokenKind,
    TxHash,
};
