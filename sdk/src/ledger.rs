//! The ledger surface consumed by the Drip services.
//!
//! The ledger contract owns all authoritative payment state and emits the
//! event log; this trait is the read/submit seam the indexer and keeper
//! talk through. The only write is the execution submission.

use async_trait::async_trait;

use crate::client::ClientError;
use crate::types::{Address, ExecuteCall, RawEvent, RawEventKind, Receipt,
    ScheduledPaymentSnapshot, TxHash};

/// Query and submit interface to the external ledger contract.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Returns the ledger's running payment counter (the id upper bound).
    async fn payment_count(&self) -> Result<u64, ClientError>;

    /// Reads the current snapshot of one payment.
    async fn payment(&self, id: u64) -> Result<ScheduledPaymentSnapshot, ClientError>;

    /// Reads events of one kind in the inclusive block range, optionally
    /// filtered by owner.
    async fn events(
        &self,
        kind: RawEventKind,
        from_block: u64,
        to_block: u64,
        owner: Option<Address>,
    ) -> Result<Vec<RawEvent>, ClientError>;

    /// Returns the current head block number.
    async fn block_number(&self) -> Result<u64, ClientError>;

    /// Returns the unix timestamp of a block.
    async fn block_timestamp(&self, block: u64) -> Result<u64, ClientError>;

    /// Dry-runs an execution call and returns the gas estimate.
    async fn estimate_execution(&self, call: &ExecuteCall) -> Result<u64, ClientError>;

    /// Submits an execution transaction with the given gas limit.
    async fn submit_execution(
        &self,
        call: &ExecuteCall,
        gas_limit: u64,
    ) -> Result<TxHash, ClientError>;

    /// Waits for a submitted transaction to reach a terminal state.
    async fn confirmation(&self, tx_hash: &TxHash) -> Result<Receipt, ClientError>;
}
