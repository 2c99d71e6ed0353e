//! Raw ledger event types.
//!
//! One `RawEvent` corresponds to one log entry emitted by the ledger
//! contract. Raw events are created once when read from the log and never
//! mutated; the indexer converts them into lifecycle events.

use serde::{Deserialize, Serialize};

use super::primitives::{Address, TxHash};

/// The event types the ledger contract emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEventKind {
    /// A payment was created.
    Created,
    /// A payment executed one transfer.
    Executed,
    /// A payment was cancelled by its owner.
    Cancelled,
    /// A payment was paused or resumed; the payload carries the new flag.
    StatusChanged,
    /// Funds were added to a payment.
    ToppedUp,
    /// Funds were withdrawn from a payment.
    Withdrawn,
}

impl RawEventKind {
    /// All event kinds, in the order the collector queries them.
    pub const ALL: [Self; 6] = [
        Self::Created,
        Self::Executed,
        Self::Cancelled,
        Self::StatusChanged,
        Self::ToppedUp,
        Self::Withdrawn,
    ];

    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
            Self::StatusChanged => "status_changed",
            Self::ToppedUp => "topped_up",
            Self::Withdrawn => "withdrawn",
        }
    }
}

/// One log entry read from the ledger.
///
/// Payload fields are kind-specific; fields that do not apply to a kind
/// are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event kind.
    pub kind: RawEventKind,

    /// Id of the payment the event belongs to.
    pub payment_id: u64,

    /// Block the event was emitted in.
    pub block_number: u64,

    /// Position of the log within its block.
    pub log_index: u64,

    /// Hash of the emitting transaction.
    pub tx_hash: TxHash,

    /// Amount moved, for `executed`, `topped_up` and `withdrawn`.
    #[serde(default)]
    pub amount: Option<u128>,

    /// Owner address, for `created`.
    #[serde(default)]
    pub owner: Option<Address>,

    /// Recipient address, for `created`.
    #[serde(default)]
    pub recipient: Option<Address>,

    /// Execution interval in seconds, for `created`.
    #[serde(default)]
    pub interval_secs: Option<u64>,

    /// New active flag, for `status_changed`.
    #[serde(default)]
    pub active: Option<bool>,
}

impl RawEvent {
    /// Returns the chain ordering key `(block number, log index)`.
    #[must_use]
    pub const fn ordering_key(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}
