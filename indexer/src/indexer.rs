//! The composed history indexer.
//!
//! Wires collector, aggregator and reconciler into a single on-demand
//! pass. Every invocation re-derives all state from the ledger; nothing
//! is cached between calls, so a re-run against an unchanged ledger
//! produces an identical view.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use drip_sdk::{Address, Ledger};

use crate::config::{ConfigError, IndexerConfig};
use crate::events::aggregator::fold;
use crate::events::collector::EventCollector;
use crate::events::metrics::IndexerMetrics;
use crate::events::reconciler::SnapshotReconciler;
use crate::events::types::HistoryView;

/// Rebuilds payment histories from the ledger event log on demand.
pub struct HistoryIndexer {
    /// Ledger access.
    ledger: Arc<dyn Ledger>,

    /// Configuration.
    config: IndexerConfig,

    /// Event collector.
    collector: EventCollector,

    /// Snapshot reconciler.
    reconciler: SnapshotReconciler,

    /// Metrics.
    metrics: Arc<IndexerMetrics>,
}

impl HistoryIndexer {
    /// Creates a new indexer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(ledger: Arc<dyn Ledger>, config: IndexerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let metrics = Arc::new(IndexerMetrics::new());
        let collector = EventCollector::new(
            Arc::clone(&ledger),
            config.chunk_span,
            config.fetch_concurrency,
            Arc::clone(&metrics),
        );
        let reconciler = SnapshotReconciler::new(
            Arc::clone(&ledger),
            config.fetch_concurrency,
            Arc::clone(&metrics),
        );

        Ok(Self {
            ledger,
            config,
            collector,
            reconciler,
            metrics,
        })
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<IndexerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Runs one full indexing pass against the current wall clock.
    pub async fn index(&self, owner: Option<Address>) -> HistoryView {
        let now = Utc::now().timestamp().max(0) as u64;
        self.index_at(owner, now).await
    }

    /// Runs one full indexing pass, classifying against the given time.
    pub async fn index_at(&self, owner: Option<Address>, now: u64) -> HistoryView {
        let started = Instant::now();

        let head = match self.ledger.block_number().await {
            Ok(head) => head,
            Err(e) => {
                warn!(error = %e, "indexing aborted, ledger unreachable");
                return HistoryView::with_error(format!("ledger unreachable: {}", e));
            }
        };

        if head < self.config.start_block {
            return HistoryView::empty();
        }

        let events = self
            .collector
            .collect(self.config.start_block, head, owner)
            .await;

        let mut aggregates: Vec<_> = fold(&events).into_values().collect();
        self.reconciler.reconcile(&mut aggregates, now).await;

        let mut events = events;
        events.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.ordering_key().cmp(&a.ordering_key()))
        });
        aggregates.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.payment_id.cmp(&a.payment_id))
        });

        self.metrics.record_run(started.elapsed());
        info!(
            head,
            events = events.len(),
            aggregates = aggregates.len(),
            "index pass complete"
        );

        HistoryView {
            events,
            aggregates,
            error: None,
        }
    }
}
