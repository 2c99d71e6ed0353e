//! Types for the history indexer.
//!
//! Defines lifecycle events, per-payment aggregates, and the history view
//! returned to consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drip_sdk::{Address, RawEvent, RawEventKind, TokenKind, TxHash};

/// What happened to a payment, with kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// The payment was created.
    Created {
        /// Funding account.
        owner: Address,
        /// Payout account.
        recipient: Address,
        /// Amount per execution, in base units.
        amount: u128,
        /// Execution interval in seconds.
        interval_secs: u64,
    },

    /// One transfer was executed.
    Executed {
        /// Amount transferred.
        amount: u128,
    },

    /// The payment was cancelled by its owner.
    Cancelled,

    /// The payment was paused.
    Paused,

    /// The payment was resumed.
    Resumed,

    /// Funds were added.
    ToppedUp {
        /// Amount added.
        amount: u128,
    },

    /// Funds were withdrawn.
    Withdrawn {
        /// Amount withdrawn.
        amount: u128,
    },
}

impl EventKind {
    /// Returns a human-readable name for the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Executed { .. } => "executed",
            Self::Cancelled => "cancelled",
            Self::Paused => "paused",
            Self::Resumed => "resumed",
            Self::ToppedUp { .. } => "topped_up",
            Self::Withdrawn { .. } => "withdrawn",
        }
    }
}

/// One entry in a payment's lifecycle history.
///
/// Created once when read from the ledger log; never mutated afterwards
/// except for the timestamp stamp applied by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Id of the payment the event belongs to.
    pub payment_id: u64,

    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,

    /// Hash of the emitting transaction.
    pub tx_hash: TxHash,

    /// Block the event was emitted in.
    pub block_number: u64,

    /// Position of the log within its block.
    pub log_index: u64,

    /// Wall-clock time of the emitting block.
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Converts a raw ledger log entry into a lifecycle event.
    ///
    /// A `status_changed` raw event becomes `Paused` or `Resumed` depending
    /// on its flag. Returns `None` for raw rows missing their kind-specific
    /// payload; the caller drops and logs them.
    #[must_use]
    pub fn from_raw(raw: &RawEvent) -> Option<Self> {
        let kind = match raw.kind {
            RawEventKind::Created => EventKind::Created {
                owner: raw.owner?,
                recipient: raw.recipient?,
                amount: raw.amount?,
                interval_secs: raw.interval_secs?,
            },
            RawEventKind::Executed => EventKind::Executed {
                amount: raw.amount?,
            },
            RawEventKind::Cancelled => EventKind::Cancelled,
            RawEventKind::StatusChanged => {
                if raw.active? {
                    EventKind::Resumed
                } else {
                    EventKind::Paused
                }
            }
            RawEventKind::ToppedUp => EventKind::ToppedUp {
                amount: raw.amount?,
            },
            RawEventKind::Withdrawn => EventKind::Withdrawn {
                amount: raw.amount?,
            },
        };

        Some(Self {
            payment_id: raw.payment_id,
            kind,
            tx_hash: raw.tx_hash,
            block_number: raw.block_number,
            log_index: raw.log_index,
            timestamp: DateTime::UNIX_EPOCH,
        })
    }

    /// Returns the chain ordering key `(block number, log index)`.
    #[must_use]
    pub const fn ordering_key(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}

/// Termination status of a payment.
///
/// Always recomputed from events and the current snapshot, never stored as
/// independent truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The payment is live.
    Active,
    /// The payment ran to its end date.
    Completed,
    /// The payment was cancelled or deactivated and drained.
    Deleted,
}

impl PaymentStatus {
    /// Returns a human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }
}

/// Derived summary of one payment's full history.
///
/// Rebuilt on every indexer run; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleAggregate {
    /// Payment id.
    pub payment_id: u64,

    /// Human-readable description, overlaid from the current snapshot.
    pub description: String,

    /// Funding account.
    pub owner: Address,

    /// Payout account.
    pub recipient: Address,

    /// Amount per execution, in base units.
    pub amount: u128,

    /// Token the payment pays out in.
    pub token: TokenKind,

    /// Execution interval in seconds.
    pub interval_secs: u64,

    /// When the payment was created.
    pub created_at: DateTime<Utc>,

    /// When the payment terminated, if it has.
    pub terminated_at: Option<DateTime<Utc>>,

    /// Termination status.
    pub status: PaymentStatus,

    /// Number of executed transfers.
    pub total_executions: u64,

    /// Sum of all executed transfer amounts.
    pub total_paid: u128,

    /// The payment's lifecycle events, in discovery order.
    pub events: Vec<LifecycleEvent>,
}

impl LifecycleAggregate {
    /// Initializes an aggregate from a `created` event.
    #[must_use]
    pub fn from_created(
        payment_id: u64,
        owner: Address,
        recipient: Address,
        amount: u128,
        interval_secs: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payment_id,
            description: String::new(),
            owner,
            recipient,
            amount,
            token: TokenKind::Native,
            interval_secs,
            created_at,
            terminated_at: None,
            status: PaymentStatus::Active,
            total_executions: 0,
            total_paid: 0,
            events: Vec::new(),
        }
    }
}

/// The indexer's output: a global event timeline plus per-payment
/// aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    /// All collected events, newest first.
    pub events: Vec<LifecycleEvent>,

    /// Per-payment aggregates, newest creation first.
    pub aggregates: Vec<LifecycleAggregate>,

    /// Set when the run could not establish basic ledger connectivity.
    pub error: Option<String>,
}

impl HistoryView {
    /// Creates an empty view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            aggregates: Vec::new(),
            error: None,
        }
    }

    /// Creates a view carrying a connectivity error and no data.
    #[must_use]
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            events: Vec::new(),
            aggregates: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Returns true if the run failed outright.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
