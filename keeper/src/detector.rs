//! Due-payment detection.
//!
//! Classifies payments from fresh snapshots every tick; no per-payment
//! state survives between ticks. The ledger is the only durable state.

use std::sync::Arc;

use futures::{stream, StreamExt};
use tracing::warn;

use drip_sdk::{Ledger, ScheduledPaymentSnapshot};

/// How a payment presents in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    /// Inactive with nothing left to spend; not worth scanning further.
    Skipped,
    /// Active but not yet due.
    Waiting,
    /// Active with its next execution time passed.
    Due,
}

impl PaymentState {
    /// Classifies a snapshot at the given time.
    #[must_use]
    pub fn classify(snapshot: &ScheduledPaymentSnapshot, now: u64) -> Self {
        if !snapshot.active && snapshot.is_drained() {
            return Self::Skipped;
        }
        if snapshot.is_due(now) {
            return Self::Due;
        }
        Self::Waiting
    }
}

/// A payment found due in the current tick.
///
/// Ephemeral: lives for one tick and is discarded afterwards.
#[derive(Debug, Clone)]
pub struct DueCandidate {
    /// Payment id.
    pub id: u64,

    /// Snapshot the due decision was made from.
    pub snapshot: ScheduledPaymentSnapshot,
}

/// Result of one scan over all payment ids.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Number of ids scanned.
    pub scanned: u64,

    /// Payments found due, in id order.
    pub candidates: Vec<DueCandidate>,

    /// Per-id snapshot fetch failures.
    pub failures: Vec<(u64, String)>,
}

/// Scans the ledger's id space for due payments.
pub struct DueScanner {
    /// Ledger access.
    ledger: Arc<dyn Ledger>,

    /// Maximum in-flight snapshot fetches.
    concurrency: usize,
}

impl DueScanner {
    /// Creates a new scanner.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, concurrency: usize) -> Self {
        Self {
            ledger,
            concurrency: concurrency.max(1),
        }
    }

    /// Scans ids `0..payment_count` and classifies each snapshot.
    ///
    /// Snapshot fetches fan out with bounded concurrency; a per-id fetch
    /// failure is recorded and does not stop the scan.
    ///
    /// # Errors
    ///
    /// Returns an error only when the payment counter itself cannot be
    /// read; everything past that point is failure-isolated per id.
    pub async fn scan(&self, now: u64) -> Result<ScanOutcome, drip_sdk::ClientError> {
        let count = self.ledger.payment_count().await?;

        let mut results: Vec<(u64, Result<ScheduledPaymentSnapshot, drip_sdk::ClientError>)> =
            stream::iter(0..count)
                .map(|id| {
                    let ledger = Arc::clone(&self.ledger);
                    async move { (id, ledger.payment(id).await) }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(id, _)| *id);

        let mut outcome = ScanOutcome {
            scanned: count,
            ..Default::default()
        };

        for (id, result) in results {
            match result {
                Ok(snapshot) => match PaymentState::classify(&snapshot, now) {
                    PaymentState::Due => outcome.candidates.push(DueCandidate { id, snapshot }),
                    PaymentState::Skipped | PaymentState::Waiting => {}
                },
                Err(e) => {
                    warn!(payment_id = id, error = %e, "snapshot fetch failed, skipping id");
                    outcome.failures.push((id, e.to_string()));
                }
            }
        }

        Ok(outcome)
    }
}
