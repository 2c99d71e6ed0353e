//! Event pipeline for the Drip history indexer.
//!
//! This module rebuilds per-payment lifecycle state purely from the
//! ledger's append-only event log.
//!
//! # Components
//!
//! - [`types`]: LifecycleEvent, LifecycleAggregate, HistoryView types
//! - [`collector`]: chunked, failure-tolerant log retrieval
//! - [`timestamps`]: batched block timestamp resolution
//! - [`aggregator`]: pure event folding into per-payment aggregates
//! - [`reconciler`]: current-snapshot overlay and status classification
//! - [`metrics`]: indexer metrics

pub mod aggregator;
pub mod collector;
pub mod metrics;
pub mod reconciler;
pub mod timestamps;
pub mod types;

pub use aggregator::fold;
pub use collector::{EventCollector, DEFAULT_CHUNK_SPAN, MAX_CHUNK_SPAN};
pub use metrics::{IndexerMetrics, IndexerMetricsSnapshot};
pub use reconciler::{classify, SnapshotReconciler};
pub use timestamps::TimestampResolver;
pub use types::{EventKind, HistoryView, LifecycleAggregate, LifecycleEvent, PaymentStatus};
