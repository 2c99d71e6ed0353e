//! Payment execution.
//!
//! Runs the balance-gated, two-phase execution protocol for one due
//! payment: dry-run gas estimate first, then the real submission with a
//! buffered gas limit, then confirmation. Estimation failure, submission
//! failure and reverts are distinct outcomes; none of them is retried
//! within the tick.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use drip_sdk::{ExecuteCall, Ledger, TxHash};

use super::detector::DueCandidate;

/// Outcome of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The transaction confirmed successfully.
    Executed {
        /// Transaction hash.
        tx_hash: TxHash,
        /// Gas limit the transaction was submitted with.
        gas_limit: u64,
    },

    /// The payment's funding balance does not cover one execution; nothing
    /// was sent.
    InsufficientBalance {
        /// Spendable balance in the payment's token.
        available: u128,
        /// Amount one execution requires.
        required: u128,
    },

    /// The dry-run estimate failed; nothing was sent.
    EstimationFailed(String),

    /// The submission itself failed.
    SubmissionFailed(String),

    /// The transaction was submitted but did not confirm in time.
    Dropped {
        /// Transaction hash.
        tx_hash: TxHash,
    },

    /// The transaction was included but reverted.
    Reverted(String),
}

impl ExecutionOutcome {
    /// Returns true if the payment executed.
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }

    /// Returns a short reason string for failed outcomes.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Executed { .. } => None,
            Self::InsufficientBalance {
                available,
                required,
            } => Some(format!(
                "insufficient balance: have {}, need {}",
                available, required
            )),
            Self::EstimationFailed(reason) => Some(format!("estimation failed: {}", reason)),
            Self::SubmissionFailed(reason) => Some(format!("submission failed: {}", reason)),
            Self::Dropped { tx_hash } => Some(format!("confirmation timed out: {}", tx_hash)),
            Self::Reverted(reason) => Some(format!("reverted: {}", reason)),
        }
    }
}

/// Executes due payments against the ledger.
pub struct PaymentExecutor {
    /// Ledger access.
    ledger: Arc<dyn Ledger>,

    /// Percentage added on top of the gas estimate.
    gas_buffer_percent: u64,

    /// How long to wait for a submitted transaction to confirm.
    confirmation_timeout: Duration,
}

impl PaymentExecutor {
    /// Creates a new executor.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn Ledger>,
        gas_buffer_percent: u64,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            gas_buffer_percent,
            confirmation_timeout,
        }
    }

    /// Applies the safety buffer to a gas estimate.
    #[must_use]
    pub fn buffered_gas_limit(&self, estimate: u64) -> u64 {
        estimate.saturating_add(
            estimate
                .saturating_mul(self.gas_buffer_percent)
                .saturating_div(100),
        )
    }

    /// Attempts to execute one due payment.
    ///
    /// The balance gate runs first: if the spendable balance in the
    /// payment's token is below the required amount, no transaction is
    /// sent and the payment is left for a later tick.
    pub async fn execute(&self, candidate: &DueCandidate) -> ExecutionOutcome {
        let snapshot = &candidate.snapshot;

        let available = snapshot.spendable_balance();
        if available < snapshot.amount {
            debug!(
                payment_id = candidate.id,
                available, required = snapshot.amount,
                "balance below required amount, not submitting"
            );
            return ExecutionOutcome::InsufficientBalance {
                available,
                required: snapshot.amount,
            };
        }

        let call = ExecuteCall::new(candidate.id);

        let estimate = match self.ledger.estimate_execution(&call).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(payment_id = candidate.id, error = %e, "gas estimation failed");
                return ExecutionOutcome::EstimationFailed(e.to_string());
            }
        };

        let gas_limit = self.buffered_gas_limit(estimate);

        let tx_hash = match self.ledger.submit_execution(&call, gas_limit).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                warn!(payment_id = candidate.id, error = %e, "submission failed");
                return ExecutionOutcome::SubmissionFailed(e.to_string());
            }
        };

        let receipt = match tokio::time::timeout(
            self.confirmation_timeout,
            self.ledger.confirmation(&tx_hash),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(payment_id = candidate.id, tx = %tx_hash, "confirmation timed out");
                return ExecutionOutcome::Dropped { tx_hash };
            }
        };

        match receipt {
            Ok(receipt) if receipt.is_reverted() => {
                warn!(
                    payment_id = candidate.id,
                    tx = %tx_hash,
                    reason = receipt.reason(),
                    "execution reverted"
                );
                ExecutionOutcome::Reverted(receipt.reason().to_string())
            }
            Ok(_) => {
                info!(payment_id = candidate.id, tx = %tx_hash, gas_limit, "payment executed");
                ExecutionOutcome::Executed { tx_hash, gas_limit }
            }
            Err(e) => {
                warn!(payment_id = candidate.id, tx = %tx_hash, error = %e, "confirmation failed");
                ExecutionOutcome::SubmissionFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLedger;
    use drip_sdk::{Address, ScheduledPaymentSnapshot, TokenKind};

    fn candidate(amount: u128, native_balance: u128) -> DueCandidate {
        DueCandidate {
            id: 1,
            snapshot: ScheduledPaymentSnapshot {
                id: 1,
                owner: Address::new([1u8; 20]),
                recipient: Address::new([2u8; 20]),
                amount,
                token: TokenKind::Native,
                interval_secs: 3600,
                next_execution: 0,
                active: true,
                description: String::new(),
                native_balance,
                token_balance: 0,
                end_date: 0,
            },
        }
    }

    fn executor(ledger: &Arc<MockLedger>) -> PaymentExecutor {
        PaymentExecutor::new(
            Arc::clone(ledger) as Arc<dyn Ledger>,
            25,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_buffered_gas_limit() {
        let ledger = Arc::new(MockLedger::new());
        let executor = executor(&ledger);

        assert_eq!(executor.buffered_gas_limit(100_000), 125_000);
        assert_eq!(executor.buffered_gas_limit(0), 0);
    }

    #[test]
    fn test_buffered_gas_limit_saturates() {
        let ledger = Arc::new(MockLedger::new());
        let executor = executor(&ledger);

        assert_eq!(executor.buffered_gas_limit(u64::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_execute_success() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_estimate(80_000);

        let outcome = executor(&ledger).execute(&candidate(100, 1_000)).await;

        assert!(outcome.is_executed());
        assert!(outcome.failure_reason().is_none());
        match outcome {
            ExecutionOutcome::Executed { gas_limit, .. } => assert_eq!(gas_limit, 100_000),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(ledger.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_insufficient_balance_sends_nothing() {
        let ledger = Arc::new(MockLedger::new());

        let outcome = executor(&ledger).execute(&candidate(100, 99)).await;

        assert_eq!(
            outcome,
            ExecutionOutcome::InsufficientBalance {
                available: 99,
                required: 100
            }
        );
        assert_eq!(ledger.estimate_calls(), 0);
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_execute_balance_gate_uses_token_balance() {
        let ledger = Arc::new(MockLedger::new());
        let mut cand = candidate(100, 1_000);
        cand.snapshot.token = TokenKind::Token(Address::new([9u8; 20]));
        cand.snapshot.token_balance = 50;

        let outcome = executor(&ledger).execute(&cand).await;

        // Native balance is plentiful but irrelevant for a token payment.
        assert_eq!(
            outcome,
            ExecutionOutcome::InsufficientBalance {
                available: 50,
                required: 100
            }
        );
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_execute_estimation_failure() {
        let ledger = Arc::new(MockLedger::new());
        ledger.fail_estimation("execution would revert: payment not due");

        let outcome = executor(&ledger).execute(&candidate(100, 1_000)).await;

        match outcome {
            ExecutionOutcome::EstimationFailed(reason) => {
                assert!(reason.contains("payment not due"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_execute_submission_failure() {
        let ledger = Arc::new(MockLedger::new());
        ledger.fail_submission("nonce too low");

        let outcome = executor(&ledger).execute(&candidate(100, 1_000)).await;

        match outcome {
            ExecutionOutcome::SubmissionFailed(reason) => {
                assert!(reason.contains("nonce too low"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_revert_carries_reason() {
        let ledger = Arc::new(MockLedger::new());
        ledger.revert_with("interval not elapsed");

        let outcome = executor(&ledger).execute(&candidate(100, 1_000)).await;

        assert_eq!(
            outcome,
            ExecutionOutcome::Reverted("interval not elapsed".to_string())
        );
    }

    #[tokio::test]
    async fn test_execute_confirmation_timeout_drops() {
        let ledger = Arc::new(MockLedger::new());
        ledger.hang_confirmation();

        let executor = PaymentExecutor::new(
            Arc::clone(&ledger) as Arc<dyn Ledger>,
            25,
            Duration::from_millis(10),
        );

        let outcome = executor.execute(&candidate(100, 1_000)).await;

        match outcome {
            ExecutionOutcome::Dropped { .. } => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
        // The transaction was submitted before the confirmation stalled.
        assert_eq!(ledger.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_submits_buffered_limit() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_estimate(60_000);

        executor(&ledger).execute(&candidate(100, 1_000)).await;

        let submissions = ledger.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].1, 75_000);
    }

    #[test]
    fn test_failure_reason_strings() {
        let outcome = ExecutionOutcome::InsufficientBalance {
            available: 1,
            required: 2,
        };
        assert_eq!(
            outcome.failure_reason().as_deref(),
            Some("insufficient balance: have 1, need 2")
        );

        let outcome = ExecutionOutcome::Reverted("boom".to_string());
        assert_eq!(outcome.failure_reason().as_deref(), Some("reverted: boom"));
    }
}
