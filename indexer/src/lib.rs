//! Drip Indexer - event-sourced history for recurring payments.
//!
//! The ledger contract stores only current payment state; history exists
//! solely in its event log. This crate rebuilds each payment's full
//! lifecycle (creation, executions, pauses, top-ups, withdrawals,
//! termination) by replaying that log and reconciling the result against
//! current snapshots.
//!
//! Every indexing pass is stateless: nothing is persisted between runs,
//! and a re-run against an unchanged ledger yields an identical view.
//!
//! # Components
//!
//! - [`events`]: collection, folding and reconciliation pipeline
//! - [`config`]: indexer configuration
//! - [`indexer`]: the composed [`HistoryIndexer`]

pub mod config;
pub mod events;
pub mod indexer;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, IndexerConfig};
pub use events::{
    fold, EventCollector, EventKind, HistoryView, IndexerMetrics, LifecycleAggregate,
    LifecycleEvent, PaymentStatus, SnapshotReconciler, TimestampResolver,
};
pub use indexer::HistoryIndexer;
