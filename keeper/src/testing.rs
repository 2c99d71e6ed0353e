//! Test support: a scriptable in-memory ledger.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use drip_sdk::{
    Address, ClientError, ExecuteCall, Ledger, RawEvent, RawEventKind, Receipt,
    ScheduledPaymentSnapshot, TxHash,
};

/// In-memory `Ledger` with scriptable execution behavior.
pub(crate) struct MockLedger {
    payments: Mutex<HashMap<u64, ScheduledPaymentSnapshot>>,
    failing_payments: Mutex<HashSet<u64>>,
    count_fails: AtomicBool,
    estimate: AtomicU64,
    estimate_calls: AtomicU64,
    estimation_error: Mutex<Option<String>>,
    submission_error: Mutex<Option<String>>,
    global_revert: Mutex<Option<String>>,
    confirmation_hangs: AtomicBool,
    reverts: Mutex<HashMap<u64, String>>,
    submissions: Mutex<Vec<(ExecuteCall, u64)>>,
    tx_payments: Mutex<HashMap<TxHash, u64>>,
}

impl MockLedger {
    pub(crate) fn new() -> Self {
        Self {
            payments: Mutex::new(HashMap::new()),
            failing_payments: Mutex::new(HashSet::new()),
            count_fails: AtomicBool::new(false),
            estimate: AtomicU64::new(21_000),
            estimate_calls: AtomicU64::new(0),
            estimation_error: Mutex::new(None),
            submission_error: Mutex::new(None),
            global_revert: Mutex::new(None),
            confirmation_hangs: AtomicBool::new(false),
            reverts: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            tx_payments: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn set_payment(&self, snapshot: ScheduledPaymentSnapshot) {
        self.payments
            .lock()
            .expect("lock")
            .insert(snapshot.id, snapshot);
    }

    pub(crate) fn fail_payment(&self, id: u64) {
        self.failing_payments.lock().expect("lock").insert(id);
    }

    pub(crate) fn fail_count(&self) {
        self.count_fails.store(true, Ordering::Relaxed);
    }

    pub(crate) fn set_estimate(&self, gas: u64) {
        self.estimate.store(gas, Ordering::Relaxed);
    }

    pub(crate) fn fail_estimation(&self, reason: &str) {
        *self.estimation_error.lock().expect("lock") = Some(reason.to_string());
    }

    pub(crate) fn fail_submission(&self, reason: &str) {
        *self.submission_error.lock().expect("lock") = Some(reason.to_string());
    }

    pub(crate) fn hang_confirmation(&self) {
        self.confirmation_hangs.store(true, Ordering::Relaxed);
    }

    pub(crate) fn revert_with(&self, reason: &str) {
        *self.global_revert.lock().expect("lock") = Some(reason.to_string());
    }

    pub(crate) fn revert_for(&self, payment_id: u64, reason: &str) {
        self.reverts
            .lock()
            .expect("lock")
            .insert(payment_id, reason.to_string());
    }

    pub(crate) fn submissions(&self) -> Vec<(ExecuteCall, u64)> {
        self.submissions.lock().expect("lock").clone()
    }

    pub(crate) fn estimate_calls(&self) -> u64 {
        self.estimate_calls.load(Ordering::Relaxed)
    }

    fn tx_hash_for(&self, payment_id: u64, nonce: usize) -> TxHash {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&payment_id.to_be_bytes());
        bytes[8..16].copy_from_slice(&(nonce as u64).to_be_bytes());
        TxHash::new(bytes)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn payment_count(&self) -> Result<u64, ClientError> {
        if self.count_fails.load(Ordering::Relaxed) {
            return Err(ClientError::Timeout);
        }
        let payments = self.payments.lock().expect("lock");
        Ok(payments.keys().max().map_or(0, |max| max + 1))
    }

    async fn payment(&self, id: u64) -> Result<ScheduledPaymentSnapshot, ClientError> {
        if self.failing_payments.lock().expect("lock").contains(&id) {
            return Err(ClientError::Timeout);
        }

        self.payments
            .lock()
            .expect("lock")
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("payment {}", id)))
    }

    async fn events(
        &self,
        _kind: RawEventKind,
        _from_block: u64,
        _to_block: u64,
        _owner: Option<Address>,
    ) -> Result<Vec<RawEvent>, ClientError> {
        Ok(Vec::new())
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        Ok(0)
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ClientError> {
        Ok(block)
    }

    async fn estimate_execution(&self, _call: &ExecuteCall) -> Result<u64, ClientError> {
        self.estimate_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(reason) = self.estimation_error.lock().expect("lock").clone() {
            return Err(ClientError::Api {
                code: "ESTIMATION_FAILED".to_string(),
                message: reason,
            });
        }

        Ok(self.estimate.load(Ordering::Relaxed))
    }

    async fn submit_execution(
        &self,
        call: &ExecuteCall,
        gas_limit: u64,
    ) -> Result<TxHash, ClientError> {
        if let Some(reason) = self.submission_error.lock().expect("lock").clone() {
            return Err(ClientError::Api {
                code: "SUBMISSION_FAILED".to_string(),
                message: reason,
            });
        }

        let mut submissions = self.submissions.lock().expect("lock");
        let tx_hash = self.tx_hash_for(call.payment_id, submissions.len());
        submissions.push((*call, gas_limit));
        self.tx_payments
            .lock()
            .expect("lock")
            .insert(tx_hash, call.payment_id);
        Ok(tx_hash)
    }

    async fn confirmation(&self, tx_hash: &TxHash) -> Result<Receipt, ClientError> {
        if self.confirmation_hangs.load(Ordering::Relaxed) {
            std::future::pending::<()>().await;
        }

        let payment_id = self
            .tx_payments
            .lock()
            .expect("lock")
            .get(tx_hash)
            .copied();

        let reason = match payment_id {
            Some(id) => self
                .reverts
                .lock()
                .expect("lock")
                .get(&id)
                .cloned()
                .or_else(|| self.global_revert.lock().expect("lock").clone()),
            None => None,
        };

        Ok(Receipt {
            tx_hash: *tx_hash,
            block_number: 1,
            success: reason.is_none(),
            revert_reason: reason,
        })
    }
}
