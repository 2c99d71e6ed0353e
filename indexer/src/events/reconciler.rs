//! Snapshot reconciliation.
//!
//! Overlays current ledger truth onto folded aggregates and derives each
//! payment's termination status.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use futures::{stream, StreamExt};
use tracing::warn;

use drip_sdk::{Ledger, ScheduledPaymentSnapshot};

use super::metrics::IndexerMetrics;
use super::types::{LifecycleAggregate, PaymentStatus};

/// Classifies a payment from its current snapshot.
///
/// Evaluated only for aggregates that carry no `cancelled` event; a
/// cancelled payment is `Deleted` no matter what the snapshot says.
/// Returns the status and, for completed payments, the termination time.
///
/// The drained rule is a heuristic: a deactivated payment with zero
/// balances and no end date reports `deleted` even when it simply ran out
/// of funds.
#[must_use]
pub fn classify(snapshot: &ScheduledPaymentSnapshot, now: u64) -> (PaymentStatus, Option<u64>) {
    if !snapshot.active {
        if let Some(end_date) = snapshot.end_date() {
            if now >= end_date {
                return (PaymentStatus::Completed, Some(end_date));
            }
        }
        if snapshot.is_drained() {
            return (PaymentStatus::Deleted, None);
        }
    }
    (PaymentStatus::Active, None)
}

/// Enriches aggregates with current ledger snapshots.
pub struct SnapshotReconciler {
    /// Ledger access.
    ledger: Arc<dyn Ledger>,

    /// Maximum in-flight snapshot fetches.
    concurrency: usize,

    /// Metrics.
    metrics: Arc<IndexerMetrics>,
}

impl SnapshotReconciler {
    /// Creates a new reconciler.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, concurrency: usize, metrics: Arc<IndexerMetrics>) -> Self {
        Self {
            ledger,
            concurrency: concurrency.max(1),
            metrics,
        }
    }

    /// Reconciles every aggregate against its current snapshot, in place.
    ///
    /// Payments already `Deleted` by a cancelled event are left untouched.
    /// A snapshot fetch failure leaves that aggregate as folded and is
    /// logged; the pass continues.
    pub async fn reconcile(&self, aggregates: &mut [LifecycleAggregate], now: u64) {
        let ids: Vec<u64> = aggregates
            .iter()
            .filter(|a| a.status != PaymentStatus::Deleted)
            .map(|a| a.payment_id)
            .collect();

        let snapshots = self.fetch_snapshots(&ids).await;

        for aggregate in aggregates.iter_mut() {
            if aggregate.status == PaymentStatus::Deleted {
                continue;
            }

            let Some(snapshot) = snapshots.get(&aggregate.payment_id) else {
                continue;
            };

            aggregate.description = snapshot.description.clone();
            aggregate.token = snapshot.token;
            aggregate.recipient = snapshot.recipient;
            aggregate.amount = snapshot.amount;

            let (status, terminated_at) = classify(snapshot, now);
            aggregate.status = status;
            if let Some(end_date) = terminated_at {
                aggregate.terminated_at = DateTime::from_timestamp(end_date as i64, 0);
            }
        }
    }

    /// Fetches current snapshots for the given ids with bounded
    /// concurrency.
    async fn fetch_snapshots(&self, ids: &[u64]) -> HashMap<u64, ScheduledPaymentSnapshot> {
        let results: Vec<(u64, Result<ScheduledPaymentSnapshot, drip_sdk::ClientError>)> =
            stream::iter(ids.to_vec())
                .map(|id| {
                    let ledger = Arc::clone(&self.ledger);
                    async move { (id, ledger.payment(id).await) }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut snapshots = HashMap::new();
        for (id, result) in results {
            match result {
                Ok(snapshot) => {
                    self.metrics.record_snapshot_fetched();
                    snapshots.insert(id, snapshot);
                }
                Err(e) => {
                    warn!(payment_id = id, error = %e, "snapshot fetch failed, aggregate left as folded");
                    self.metrics.record_snapshot_failure();
                }
            }
        }
        snapshots
    }
}
