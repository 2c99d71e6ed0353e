//! Metrics tracking for the history indexer.
//!
//! Provides atomic counters for monitoring collection and reconciliation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics for the history indexer.
#[derive(Debug)]
pub struct IndexerMetrics {
    /// Completed indexer runs.
    runs: AtomicU64,

    /// Chunks scanned successfully.
    chunks_scanned: AtomicU64,

    /// Chunks skipped after a fetch failure.
    chunks_failed: AtomicU64,

    /// Raw events collected.
    events_collected: AtomicU64,

    /// Block timestamps resolved.
    timestamps_resolved: AtomicU64,

    /// Block timestamp fetch failures.
    timestamp_failures: AtomicU64,

    /// Snapshots fetched during reconciliation.
    snapshots_fetched: AtomicU64,

    /// Snapshot fetch failures.
    snapshot_failures: AtomicU64,

    /// Total run time in nanoseconds.
    total_run_time_ns: AtomicU64,

    /// Start time for rate calculation.
    start_time: Instant,
}

impl Default for IndexerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexerMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            chunks_scanned: AtomicU64::new(0),
            chunks_failed: AtomicU64::new(0),
            events_collected: AtomicU64::new(0),
            timestamps_resolved: AtomicU64::new(0),
            timestamp_failures: AtomicU64::new(0),
            snapshots_fetched: AtomicU64::new(0),
            snapshot_failures: AtomicU64::new(0),
            total_run_time_ns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed run.
    pub fn record_run(&self, duration: Duration) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.total_run_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Records a successfully scanned chunk and its event count.
    pub fn record_chunk(&self, events: u64) {
        self.chunks_scanned.fetch_add(1, Ordering::Relaxed);
        self.events_collected.fetch_add(events, Ordering::Relaxed);
    }

    /// Records a skipped chunk.
    pub fn record_chunk_failure(&self) {
        self.chunks_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a resolved block timestamp.
    pub fn record_timestamp_resolved(&self) {
        self.timestamps_resolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed block timestamp fetch.
    pub fn record_timestamp_failure(&self) {
        self.timestamp_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fetched snapshot.
    pub fn record_snapshot_fetched(&self) {
        self.snapshots_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed snapshot fetch.
    pub fn record_snapshot_failure(&self) {
        self.snapshot_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of completed runs.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Returns the number of chunks scanned.
    #[must_use]
    pub fn chunks_scanned(&self) -> u64 {
        self.chunks_scanned.load(Ordering::Relaxed)
    }

    /// Returns the number of chunks skipped.
    #[must_use]
    pub fn chunks_failed(&self) -> u64 {
        self.chunks_failed.load(Ordering::Relaxed)
    }

    /// Returns the number of events collected.
    #[must_use]
    pub fn events_collected(&self) -> u64 {
        self.events_collected.load(Ordering::Relaxed)
    }

    /// Returns the number of timestamps resolved.
    #[must_use]
    pub fn timestamps_resolved(&self) -> u64 {
        self.timestamps_resolved.load(Ordering::Relaxed)
    }

    /// Returns the number of timestamp fetch failures.
    #[must_use]
    pub fn timestamp_failures(&self) -> u64 {
        self.timestamp_failures.load(Ordering::Relaxed)
    }

    /// Returns the number of snapshots fetched.
    #[must_use]
    pub fn snapshots_fetched(&self) -> u64 {
        self.snapshots_fetched.load(Ordering::Relaxed)
    }

    /// Returns the number of snapshot fetch failures.
    #[must_use]
    pub fn snapshot_failures(&self) -> u64 {
        self.snapshot_failures.load(Ordering::Relaxed)
    }

    /// Returns the average run time.
    #[must_use]
    pub fn average_run_time(&self) -> Duration {
        let runs = self.runs();
        if runs == 0 {
            return Duration::ZERO;
        }
        let total_ns = self.total_run_time_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total_ns / runs)
    }

    /// Returns the chunk failure rate (0.0 to 1.0).
    #[must_use]
    pub fn chunk_failure_rate(&self) -> f64 {
        let total = self.chunks_scanned() + self.chunks_failed();
        if total == 0 {
            return 0.0;
        }
        self.chunks_failed() as f64 / total as f64
    }

    /// Returns the uptime since metrics creation.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> IndexerMetricsSnapshot {
        IndexerMetricsSnapshot {
            runs: self.runs(),
            chunks_scanned: self.chunks_scanned(),
            chunks_failed: self.chunks_failed(),
            events_collected: self.events_collected(),
            timestamps_resolved: self.timestamps_resolved(),
            timestamp_failures: self.timestamp_failures(),
            snapshots_fetched: self.snapshots_fetched(),
            snapshot_failures: self.snapshot_failures(),
            average_run_time: self.average_run_time(),
            chunk_failure_rate: self.chunk_failure_rate(),
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.runs.store(0, Ordering::Relaxed);
        self.chunks_scanned.store(0, Ordering::Relaxed);
        self.chunks_failed.store(0, Ordering::Relaxed);
        self.events_collected.store(0, Ordering::Relaxed);
        self.timestamps_resolved.store(0, Ordering::Relaxed);
        self.timestamp_failures.store(0, Ordering::Relaxed);
        self.snapshots_fetched.store(0, Ordering::Relaxed);
        self.snapshot_failures.store(0, Ordering::Relaxed);
        self.total_run_time_ns.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of indexer metrics.
#[derive(Debug, Clone)]
pub struct IndexerMetricsSnapshot {
    /// Completed runs.
    pub runs: u64,
    /// Chunks scanned.
    pub chunks_scanned: u64,
    /// Chunks skipped.
    pub chunks_failed: u64,
    /// Events collected.
    pub events_collected: u64,
    /// Timestamps resolved.
    pub timestamps_resolved: u64,
    /// Timestamp fetch failures.
    pub timestamp_failures: u64,
    /// Snapshots fetched.
    pub snapshots_fetched: u64,
    /// Snapshot fetch failures.
    pub snapshot_failures: u64,
    /// Average run time.
    pub average_run_time: Duration,
    /// Chunk failure rate.
    pub chunk_failure_rate: f64,
}
