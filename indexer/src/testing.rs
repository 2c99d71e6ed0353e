//! Test support: a scriptable in-memory ledger.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use drip_sdk::{
    Address, ClientError, ExecuteCall, Ledger, RawEvent, RawEventKind, Receipt,
    ScheduledPaymentSnapshot, TxHash,
};

/// In-memory `Ledger` with scriptable per-method failures.
pub(crate) struct MockLedger {
    payments: Mutex<HashMap<u64, ScheduledPaymentSnapshot>>,
    raw_events: Mutex<Vec<RawEvent>>,
    owners: Mutex<HashMap<u64, Address>>,
    block_timestamps: Mutex<HashMap<u64, u64>>,
    failing_timestamp_blocks: Mutex<HashSet<u64>>,
    failing_event_ranges: Mutex<Vec<(u64, u64)>>,
    failing_payments: Mutex<HashSet<u64>>,
    head: AtomicU64,
    head_fails: AtomicBool,
    timestamp_fetches: AtomicU64,
    payment_fetches: AtomicU64,
}

impl MockLedger {
    pub(crate) fn new() -> Self {
        Self {
            payments: Mutex::new(HashMap::new()),
            raw_events: Mutex::new(Vec::new()),
            owners: Mutex::new(HashMap::new()),
            block_timestamps: Mutex::new(HashMap::new()),
            failing_timestamp_blocks: Mutex::new(HashSet::new()),
            failing_event_ranges: Mutex::new(Vec::new()),
            failing_payments: Mutex::new(HashSet::new()),
            head: AtomicU64::new(0),
            head_fails: AtomicBool::new(false),
            timestamp_fetches: AtomicU64::new(0),
            payment_fetches: AtomicU64::new(0),
        }
    }

    pub(crate) fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::Relaxed);
    }

    pub(crate) fn fail_head(&self) {
        self.head_fails.store(true, Ordering::Relaxed);
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

    pub(crate) fn set_block_timestamp(&self, block: u64, secs: u64) {
        self.block_timestamps
            .lock()
            .expect("lock")
            .insert(block, secs);
    }

    pub(crate) fn fail_timestamp_for(&self, block: u64) {
        self.failing_timestamp_blocks
            .lock()
            .expect("lock")
            .insert(block);
    }

    pub(crate) fn fail_events_in_range(&self, from: u64, to: u64) {
        self.failing_event_ranges
            .lock()
            .expect("lock")
            .push((from, to));
    }

    pub(crate) fn add_raw_event(&self, event: RawEvent) {
        if let Some(owner) = event.owner {
            self.owners
                .lock()
                .expect("lock")
                .entry(event.payment_id)
                .or_insert(owner);
        }
        self.raw_events.lock().expect("lock").push(event);
    }

    pub(crate) fn add_created_event(
        &self,
        payment_id: u64,
        block: u64,
        log_index: u64,
        owner: Address,
        amount: u128,
        interval_secs: u64,
    ) {
        self.add_raw_event(RawEvent {
            kind: RawEventKind::Created,
            payment_id,
            block_number: block,
            log_index,
            tx_hash: TxHash::new([block as u8; 32]),
            amount: Some(amount),
            owner: Some(owner),
            recipient: Some(Address::new([0xee; 20])),
            interval_secs: Some(interval_secs),
            active: None,
        });
    }

    pub(crate) fn add_executed_event(
        &self,
        payment_id: u64,
        block: u64,
        log_index: u64,
        amount: u128,
    ) {
        self.add_raw_event(RawEvent {
            kind: RawEventKind::Executed,
            payment_id,
            block_number: block,
            log_index,
            tx_hash: TxHash::new([block as u8; 32]),
            amount: Some(amount),
            owner: None,
            recipient: None,
            interval_secs: None,
            active: None,
        });
    }

    pub(crate) fn add_cancelled_event(&self, payment_id: u64, block: u64, log_index: u64) {
        self.add_raw_event(RawEvent {
            kind: RawEventKind::Cancelled,
            payment_id,
            block_number: block,
            log_index,
            tx_hash: TxHash::new([block as u8; 32]),
            amount: None,
            owner: None,
            recipient: None,
            interval_secs: None,
            active: None,
        });
    }

    pub(crate) fn timestamp_fetches(&self) -> u64 {
        self.timestamp_fetches.load(Ordering::Relaxed)
    }

    pub(crate) fn payment_fetches(&self) -> u64 {
        self.payment_fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn payment_count(&self) -> Result<u64, ClientError> {
        let payments = self.payments.lock().expect("lock");
        Ok(payments.keys().max().map_or(0, |max| max + 1))
    }

    async fn payment(&self, id: u64) -> Result<ScheduledPaymentSnapshot, ClientError> {
        self.payment_fetches.fetch_add(1, Ordering::Relaxed);

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
        kind: RawEventKind,
        from_block: u64,
        to_block: u64,
        owner: Option<Address>,
    ) -> Result<Vec<RawEvent>, ClientError> {
        let failing = self.failing_event_ranges.lock().expect("lock");
        if failing
            .iter()
            .any(|&(from, to)| from_block <= to && from <= to_block)
        {
            return Err(ClientError::Timeout);
        }
        drop(failing);

        let owners = self.owners.lock().expect("lock");
        let mut events: Vec<RawEvent> = self
            .raw_events
            .lock()
            .expect("lock")
            .iter()
            .filter(|e| e.kind == kind)
            .filter(|e| e.block_number >= from_block && e.block_number <= to_block)
            .filter(|e| match owner {
                Some(filter) => owners.get(&e.payment_id) == Some(&filter),
                None => true,
            })
            .cloned()
            .collect();
        events.sort_by_key(RawEvent::ordering_key);
        Ok(events)
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        if self.head_fails.load(Ordering::Relaxed) {
            return Err(ClientError::Timeout);
        }
        Ok(self.head.load(Ordering::Relaxed))
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ClientError> {
        self.timestamp_fetches.fetch_add(1, Ordering::Relaxed);

        if self
            .failing_timestamp_blocks
            .lock()
            .expect("lock")
            .contains(&block)
        {
            return Err(ClientError::Timeout);
        }

        // Unset blocks resolve to their own number as the timestamp.
        Ok(self
            .block_timestamps
            .lock()
            .expect("lock")
            .get(&block)
            .copied()
            .unwrap_or(block))
    }

    async fn estimate_execution(&self, _call: &ExecuteCall) -> Result<u64, ClientError> {
        Ok(21_000)
    }

    async fn submit_execution(
        &self,
        _call: &ExecuteCall,
        _gas_limit: u64,
    ) -> Result<TxHash, ClientError> {
        Ok(TxHash::new([0u8; 32]))
    }

    async fn confirmation(&self, tx_hash: &TxHash) -> Result<Receipt, ClientError> {
        Ok(Receipt {
            tx_hash: *tx_hash,
            block_number: self.head.load(Ordering::Relaxed),
            success: true,
            revert_reason: None,
        })
    }
}
