//! Main keeper service.
//!
//! Orchestrates due detection and execution in an endless polling loop.
//! Every tick is a pure function of ledger state and the wall clock: no
//! per-payment state is carried between ticks, so restarting the process
//! is always safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use drip_sdk::Ledger;

use super::config::{ConfigError, KeeperConfig};
use super::detector::DueScanner;
use super::executor::{ExecutionOutcome, PaymentExecutor};
use super::metrics::KeeperMetrics;

/// One per-payment failure within a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickFailure {
    /// Payment id.
    pub payment_id: u64,

    /// Human-readable reason.
    pub reason: String,
}

/// Structured summary of one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    /// When the tick started.
    pub timestamp: DateTime<Utc>,

    /// Number of payment ids scanned.
    pub scanned: u64,

    /// Number of payments found due.
    pub due: u64,

    /// Number of executions confirmed.
    pub executed: u64,

    /// Per-payment failures, including insufficient-balance skips.
    pub failures: Vec<TickFailure>,

    /// Set when the tick could not read the ledger at all.
    pub error: Option<String>,
}

/// The main keeper service.
pub struct KeeperService {
    /// Configuration.
    config: KeeperConfig,

    /// Due-payment scanner.
    scanner: DueScanner,

    /// Payment executor.
    executor: PaymentExecutor,

    /// Metrics.
    metrics: Arc<KeeperMetrics>,

    /// Whether the service is running.
    running: Arc<AtomicBool>,
}

impl KeeperService {
    /// Creates a new keeper service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(ledger: Arc<dyn Ledger>, config: KeeperConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let scanner = DueScanner::new(Arc::clone(&ledger), config.snapshot_concurrency);
        let executor = PaymentExecutor::new(
            Arc::clone(&ledger),
            config.gas_buffer_percent,
            Duration::from_secs(config.confirmation_timeout_secs),
        );

        Ok(Self {
            config,
            scanner,
            executor,
            metrics: Arc::new(KeeperMetrics::new()),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<KeeperMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &KeeperConfig {
        &self.config
    }

    /// Returns true if the service is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stops the service after the current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Keeper service stop requested");
    }

    /// Runs the keeper loop until stopped.
    ///
    /// Ticks never overlap: the next tick starts only after the current
    /// one fully completes and the poll interval elapses.
    pub async fn run(&self) {
        self.running.store(true, Ordering::Relaxed);

        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            gas_buffer_percent = self.config.gas_buffer_percent,
            "Keeper service started"
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);

        while self.is_running() {
            let report = self.tick().await;

            info!(
                timestamp = %report.timestamp,
                scanned = report.scanned,
                due = report.due,
                executed = report.executed,
                failures = report.failures.len(),
                "tick complete"
            );
            if let Ok(json) = serde_json::to_string(&report) {
                debug!(report = %json, "tick report");
            }

            tokio::time::sleep(poll_interval).await;
        }

        info!("Keeper service stopped");
    }

    /// Runs a single tick against the current wall clock.
    pub async fn tick(&self) -> TickReport {
        let now = Utc::now().timestamp().max(0) as u64;
        self.tick_at(now).await
    }

    /// Runs a single tick, treating `now` as the current time.
    ///
    /// Candidates execute sequentially; each per-payment failure is
    /// recorded and never stops the tick.
    pub async fn tick_at(&self, now: u64) -> TickReport {
        let timestamp = Utc::now();

        let outcome = match self.scanner.scan(now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "tick aborted, payment counter unreadable");
                return TickReport {
                    timestamp,
                    scanned: 0,
                    due: 0,
                    executed: 0,
                    failures: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        let mut failures: Vec<TickFailure> = outcome
            .failures
            .iter()
            .map(|(payment_id, reason)| TickFailure {
                payment_id: *payment_id,
                reason: format!("snapshot fetch failed: {}", reason),
            })
            .collect();

        let due = outcome.candidates.len() as u64;
        let mut executed = 0u64;

        for candidate in &outcome.candidates {
            let result = self.executor.execute(candidate).await;

            match &result {
                ExecutionOutcome::Executed { .. } => {
                    executed += 1;
                    self.metrics.record_execution();
                }
                ExecutionOutcome::InsufficientBalance { .. } => {
                    self.metrics.record_insufficient_balance();
                }
                ExecutionOutcome::EstimationFailed(_) => {
                    self.metrics.record_estimation_failure();
                }
                ExecutionOutcome::SubmissionFailed(_) => {
                    self.metrics.record_submission_failure();
                }
                ExecutionOutcome::Dropped { .. } => {
                    self.metrics.record_dropped();
                }
                ExecutionOutcome::Reverted(_) => {
                    self.metrics.record_revert();
                }
            }

            if let Some(reason) = result.failure_reason() {
                failures.push(TickFailure {
                    payment_id: candidate.id,
                    reason,
                });
            }
        }

        self.metrics.record_tick(outcome.scanned, due);

        TickReport {
            timestamp,
            scanned: outcome.scanned,
            due,
            executed,
            failures,
            error: None,
        }
    }
}
