//! Event collection from the ledger log.
//!
//! Walks a block range in fixed-width chunks, fetching every event kind in
//! each chunk concurrently and tolerating partial chunk failure.

use std::sync::Arc;

use futures::join;
use tracing::{debug, warn};

use drip_sdk::{Address, ClientError, Ledger, RawEvent, RawEventKind};

use super::metrics::IndexerMetrics;
use super::timestamps::TimestampResolver;
use super::types::LifecycleEvent;

/// Default chunk width in blocks, conservatively below the RPC range cap.
pub const DEFAULT_CHUNK_SPAN: u64 = 9_000;

/// Hard upper bound on chunk width accepted by ledger RPCs.
pub const MAX_CHUNK_SPAN: u64 = 10_000;

/// Collects lifecycle events from the ledger's log.
pub struct EventCollector {
    /// Ledger access.
    ledger: Arc<dyn Ledger>,

    /// Timestamp resolver for the batched stamping pass.
    resolver: TimestampResolver,

    /// Chunk width in blocks.
    chunk_span: u64,

    /// Metrics.
    metrics: Arc<IndexerMetrics>,
}

impl EventCollector {
    /// Creates a new collector.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn Ledger>,
        chunk_span: u64,
        timestamp_concurrency: usize,
        metrics: Arc<IndexerMetrics>,
    ) -> Self {
        let resolver = TimestampResolver::new(
            Arc::clone(&ledger),
            timestamp_concurrency,
            Arc::clone(&metrics),
        );
        Self {
            ledger,
            resolver,
            chunk_span: chunk_span.clamp(1, MAX_CHUNK_SPAN),
            metrics,
        }
    }

    /// Collects all lifecycle events in `[from_block, to_block]`.
    ///
    /// Chunks are scanned strictly in increasing order so that creation
    /// events are folded before the executions that follow them. A chunk
    /// whose fetch fails is skipped with a warning; the scan continues
    /// with the next chunk. After the scan, block timestamps are resolved
    /// in one batched pass and stamped onto every event.
    pub async fn collect(
        &self,
        from_block: u64,
        to_block: u64,
        owner: Option<Address>,
    ) -> Vec<LifecycleEvent> {
        let mut events: Vec<LifecycleEvent> = Vec::new();

        let mut start = from_block;
        while start <= to_block {
            let end = start.saturating_add(self.chunk_span - 1).min(to_block);

            match self.fetch_chunk(start, end, owner).await {
                Ok(raw_events) => {
                    self.metrics.record_chunk(raw_events.len() as u64);
                    debug!(from = start, to = end, count = raw_events.len(), "chunk scanned");

                    for raw in &raw_events {
                        match LifecycleEvent::from_raw(raw) {
                            Some(event) => events.push(event),
                            None => {
                                warn!(
                                    payment_id = raw.payment_id,
                                    kind = raw.kind.as_str(),
                                    block = raw.block_number,
                                    "malformed ledger event dropped"
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(from = start, to = end, error = %e, "chunk fetch failed, skipping");
                    self.metrics.record_chunk_failure();
                }
            }

            start = end.saturating_add(1);
        }

        self.stamp_timestamps(&mut events).await;
        events
    }

    /// Fetches all event kinds for one chunk concurrently.
    ///
    /// Events come back concatenated in kind order (creations first),
    /// which is what the fold downstream relies on; no within-chunk sort
    /// is applied.
    async fn fetch_chunk(
        &self,
        from_block: u64,
        to_block: u64,
        owner: Option<Address>,
    ) -> Result<Vec<RawEvent>, ClientError> {
        let (created, executed, cancelled, status_changed, topped_up, withdrawn) = join!(
            self.ledger
                .events(RawEventKind::Created, from_block, to_block, owner),
            self.ledger
                .events(RawEventKind::Executed, from_block, to_block, owner),
            self.ledger
                .events(RawEventKind::Cancelled, from_block, to_block, owner),
            self.ledger
                .events(RawEventKind::StatusChanged, from_block, to_block, owner),
            self.ledger
                .events(RawEventKind::ToppedUp, from_block, to_block, owner),
            self.ledger
                .events(RawEventKind::Withdrawn, from_block, to_block, owner),
        );

        let mut all = created?;
        all.extend(executed?);
        all.extend(cancelled?);
        all.extend(status_changed?);
        all.extend(topped_up?);
        all.extend(withdrawn?);
        Ok(all)
    }

    /// Resolves and stamps block timestamps onto the collected events.
    async fn stamp_timestamps(&self, events: &mut [LifecycleEvent]) {
        if events.is_empty() {
            return;
        }

        let blocks: Vec<u64> = events.iter().map(|e| e.block_number).collect();
        let resolved = self.resolver.resolve(&blocks).await;

        for event in events.iter_mut() {
            // Unresolved blocks keep the epoch stamp; the resolver already
            // warned about them.
            if let Some(ts) = resolved.get(&event.block_number) {
                event.timestamp = *ts;
            }
        }
    }
}
