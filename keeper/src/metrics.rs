//! Keeper service metrics.
//!
//! Provides atomic counters for monitoring keeper operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics for the keeper service.
#[derive(Debug)]
pub struct KeeperMetrics {
    /// Total ticks completed.
    ticks: AtomicU64,

    /// Total payment ids scanned.
    payments_scanned: AtomicU64,

    /// Total payments found due.
    due_detected: AtomicU64,

    /// Total executions confirmed.
    executions_confirmed: AtomicU64,

    /// Total payments skipped for insufficient balance.
    insufficient_balance: AtomicU64,

    /// Total gas estimation failures.
    estimation_failures: AtomicU64,

    /// Total submission failures.
    submission_failures: AtomicU64,

    /// Total transactions dropped before confirmation.
    dropped: AtomicU64,

    /// Total reverted executions.
    reverts: AtomicU64,

    /// Start time for rate calculation.
    start_time: Instant,
}

impl Default for KeeperMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl KeeperMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            payments_scanned: AtomicU64::new(0),
            due_detected: AtomicU64::new(0),
            executions_confirmed: AtomicU64::new(0),
            insufficient_balance: AtomicU64::new(0),
            estimation_failures: AtomicU64::new(0),
            submission_failures: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            reverts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick and its scan width.
    pub fn record_tick(&self, scanned: u64, due: u64) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.payments_scanned.fetch_add(scanned, Ordering::Relaxed);
        self.due_detected.fetch_add(due, Ordering::Relaxed);
    }

    /// Records a confirmed execution.
    pub fn record_execution(&self) {
        self.executions_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an insufficient-balance skip.
    pub fn record_insufficient_balance(&self) {
        self.insufficient_balance.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a gas estimation failure.
    pub fn record_estimation_failure(&self) {
        self.estimation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a submission failure.
    pub fn record_submission_failure(&self) {
        self.submission_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a transaction dropped before confirmation.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a reverted execution.
    pub fn record_revert(&self) {
        self.reverts.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total ticks completed.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Returns total ids scanned.
    #[must_use]
    pub fn payments_scanned(&self) -> u64 {
        self.payments_scanned.load(Ordering::Relaxed)
    }

    /// Returns total payments found due.
    #[must_use]
    pub fn due_detected(&self) -> u64 {
        self.due_detected.load(Ordering::Relaxed)
    }

    /// Returns total confirmed executions.
    #[must_use]
    pub fn executions_confirmed(&self) -> u64 {
        self.executions_confirmed.load(Ordering::Relaxed)
    }

    /// Returns total insufficient-balance skips.
    #[must_use]
    pub fn insufficient_balance(&self) -> u64 {
        self.insufficient_balance.load(Ordering::Relaxed)
    }

    /// Returns total estimation failures.
    #[must_use]
    pub fn estimation_failures(&self) -> u64 {
        self.estimation_failures.load(Ordering::Relaxed)
    }

    /// Returns total submission failures.
    #[must_use]
    pub fn submission_failures(&self) -> u64 {
        self.submission_failures.load(Ordering::Relaxed)
    }

    /// Returns total dropped transactions.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns total reverted executions.
    #[must_use]
    pub fn reverts(&self) -> u64 {
        self.reverts.load(Ordering::Relaxed)
    }

    /// Returns ticks per second since start.
    #[must_use]
    pub fn ticks_per_second(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.ticks() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns the uptime since metrics creation.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = KeeperMetrics::new();
        assert_eq!(metrics.ticks(), 0);
        assert_eq!(metrics.payments_scanned(), 0);
        assert_eq!(metrics.executions_confirmed(), 0);
    }

    #[test]
    fn test_metrics_record_tick() {
        let metrics = KeeperMetrics::new();
        metrics.record_tick(10, 2);
        metrics.record_tick(10, 0);

        assert_eq!(metrics.ticks(), 2);
        assert_eq!(metrics.payments_scanned(), 20);
        assert_eq!(metrics.due_detected(), 2);
    }

    #[test]
    fn test_metrics_record_outcomes() {
        let metrics = KeeperMetrics::new();
        metrics.record_execution();
        metrics.record_insufficient_balance();
        metrics.record_estimation_failure();
        metrics.record_submission_failure();
        metrics.record_dropped();
        metrics.record_revert();

        assert_eq!(metrics.executions_confirmed(), 1);
        assert_eq!(metrics.insufficient_balance(), 1);
        assert_eq!(metrics.estimation_failures(), 1);
        assert_eq!(metrics.submission_failures(), 1);
        assert_eq!(metrics.dropped(), 1);
        assert_eq!(metrics.reverts(), 1);
    }
}
