//! Scheduled payment types.
//!
//! Defines the current-state snapshot of a recurring payment as read from
//! the ledger, plus the execution call and receipt types used when
//! triggering a payment.

use serde::{Deserialize, Serialize};

use super::primitives::{Address, TokenKind, TxHash};

/// Current ledger truth for one recurring payment.
///
/// The ledger exclusively owns this record; the core only holds read-only
/// copies for the duration of one indexing pass or one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPaymentSnapshot {
    /// Unique id, monotonically assigned by the ledger.
    pub id: u64,

    /// Account that created and funds the payment.
    pub owner: Address,

    /// Account the payment pays out to.
    pub recipient: Address,

    /// Amount paid per execution, in base units.
    pub amount: u128,

    /// Token the payment pays out in.
    pub token: TokenKind,

    /// Interval between executions in seconds.
    pub interval_secs: u64,

    /// Unix timestamp of the next scheduled execution.
    pub next_execution: u64,

    /// Whether the payment is currently active.
    pub active: bool,

    /// Human-readable description.
    pub description: String,

    /// Remaining native-coin balance funding this payment.
    pub native_balance: u128,

    /// Remaining token balance funding this payment.
    pub token_balance: u128,

    /// Optional end date as a unix timestamp; 0 means no end date.
    pub end_date: u64,
}

impl ScheduledPaymentSnapshot {
    /// Returns true if the payment is active and its next execution time
    /// has passed.
    #[must_use]
    pub fn is_due(&self, now: u64) -> bool {
        self.active && self.next_execution <= now
    }

    /// Returns the balance that funds executions, picked by token kind.
    #[must_use]
    pub fn spendable_balance(&self) -> u128 {
        match self.token {
            TokenKind::Native => self.native_balance,
            TokenKind::Token(_) => self.token_balance,
        }
    }

    /// Returns true if the spendable balance covers one execution.
    #[must_use]
    pub fn has_sufficient_balance(&self) -> bool {
        self.spendable_balance() >= self.amount
    }

    /// Returns true if both balances are zero.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.native_balance == 0 && self.token_balance == 0
    }

    /// Returns the end date, if one is set.
    #[must_use]
    pub fn end_date(&self) -> Option<u64> {
        if self.end_date == 0 {
            None
        } else {
            Some(self.end_date)
        }
    }
}

/// The execution call submitted to the ledger to trigger one payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteCall {
    /// Id of the payment to execute.
    pub payment_id: u64,
}

impl ExecuteCall {
    /// Creates an execution call for the given payment.
    #[must_use]
    pub const fn new(payment_id: u64) -> Self {
        Self { payment_id }
    }
}

/// Receipt for a confirmed execution transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the transaction.
    pub tx_hash: TxHash,

    /// Block the transaction was included in.
    pub block_number: u64,

    /// Whether the transaction succeeded.
    pub success: bool,

    /// Revert reason mapped from the ledger, when the transaction failed.
    pub revert_reason: Option<String>,
}

impl Receipt {
    /// Returns true if the transaction reverted.
    #[must_use]
    pub fn is_reverted(&self) -> bool {
        !self.success
    }

    /// Returns the revert reason, or a generic one when the ledger gave
    /// none.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.revert_reason.as_deref().unwrap_or("execution reverted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ScheduledPaymentSnapshot {
        ScheduledPaymentSnapshot {
            id: 1,
            owner: Address::new([1u8; 20]),
            recipient: Address::new([2u8; 20]),
            amount: 100,
            token: TokenKind::Native,
            interval_secs: 3600,
            next_execution: 1_000,
            active: true,
            description: "rent".to_string(),
            native_balance: 500,
            token_balance: 0,
            end_date: 0,
        }
    }

    #[test]
    fn test_is_due() {
        let snap = snapshot();
        assert!(snap.is_due(1_000));
        assert!(snap.is_due(2_000));
        assert!(!snap.is_due(999));
    }

    #[test]
    fn test_is_due_inactive() {
        let snap = ScheduledPaymentSnapshot {
            active: false,
            ..snapshot()
        };
        assert!(!snap.is_due(2_000));
    }

    #[test]
    fn test_spendable_balance_native() {
        let snap = snapshot();
        assert_eq!(snap.spendable_balance(), 500);
    }

    #[test]
    fn test_spendable_balance_token() {
        let snap = ScheduledPaymentSnapshot {
            token: TokenKind::Token(Address::new([9u8; 20])),
            native_balance: 500,
            token_balance: 42,
            ..snapshot()
        };
        assert_eq!(snap.spendable_balance(), 42);
    }

    #[test]
    fn test_has_sufficient_balance() {
        let snap = snapshot();
        assert!(snap.has_sufficient_balance());

        let broke = ScheduledPaymentSnapshot {
            native_balance: 99,
            ..snapshot()
        };
        assert!(!broke.has_sufficient_balance());
    }

    #[test]
    fn test_is_drained() {
        let snap = ScheduledPaymentSnapshot {
            native_balance: 0,
            token_balance: 0,
            ..snapshot()
        };
        assert!(snap.is_drained());
        assert!(!snapshot().is_drained());
    }

    #[test]
    fn test_end_date() {
        assert_eq!(snapshot().end_date(), None);

        let ending = ScheduledPaymentSnapshot {
            end_date: 9_999,
            ..snapshot()
        };
        assert_eq!(ending.end_date(), Some(9_999));
    }

    #[test]
    fn test_receipt_reason() {
        let ok = Receipt {
            tx_hash: TxHash::new([0u8; 32]),
            block_number: 10,
            success: true,
            revert_reason: None,
        };
        assert!(!ok.is_reverted());

        let reverted = Receipt {
            success: false,
            revert_reason: Some("insufficient allowance".to_string()),
            ..ok.clone()
        };
        assert!(reverted.is_reverted());
        assert_eq!(reverted.reason(), "insufficient allowance");

        let bare = Receipt {
            success: false,
            revert_reason: None,
            ..ok
        };
        assert_eq!(bare.reason(), "execution reverted");
    }
}
