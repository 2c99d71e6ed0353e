//! Block timestamp resolution.
//!
//! The ledger log carries block numbers, not wall-clock times. The
//! resolver turns the set of blocks touched by a collection pass into
//! timestamps with a single deduplicated, bounded-concurrency batch.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use tracing::warn;

use drip_sdk::Ledger;

use super::metrics::IndexerMetrics;

/// Default number of in-flight timestamp requests.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Resolves block numbers to wall-clock timestamps.
pub struct TimestampResolver {
    /// Ledger access.
    ledger: Arc<dyn Ledger>,

    /// Maximum in-flight requests.
    concurrency: usize,

    /// Metrics.
    metrics: Arc<IndexerMetrics>,
}

impl TimestampResolver {
    /// Creates a new resolver.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, concurrency: usize, metrics: Arc<IndexerMetrics>) -> Self {
        Self {
            ledger,
            concurrency: concurrency.max(1),
            metrics,
        }
    }

    /// Resolves the timestamps of the given blocks.
    ///
    /// Duplicate block numbers are fetched once. A block whose fetch fails
    /// is logged and omitted from the map; callers stamp affected events
    /// with a fallback rather than dropping them.
    pub async fn resolve(&self, blocks: &[u64]) -> HashMap<u64, DateTime<Utc>> {
        let unique: BTreeSet<u64> = blocks.iter().copied().collect();

        let results: Vec<(u64, Result<u64, drip_sdk::ClientError>)> = stream::iter(unique)
            .map(|block| {
                let ledger = Arc::clone(&self.ledger);
                async move { (block, ledger.block_timestamp(block).await) }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut resolved = HashMap::new();
        for (block, result) in results {
            match result {
                Ok(secs) => match DateTime::from_timestamp(secs as i64, 0) {
                    Some(ts) => {
                        resolved.insert(block, ts);
                        self.metrics.record_timestamp_resolved();
                    }
                    None => {
                        warn!(block, secs, "block timestamp out of range, skipping");
                        self.metrics.record_timestamp_failure();
                    }
                },
                Err(e) => {
                    warn!(block, error = %e, "block timestamp fetch failed, skipping");
                    self.metrics.record_timestamp_failure();
                }
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLedger;

    #[tokio::test]
    async fn test_resolver_deduplicates_blocks() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_block_timestamp(100, 1_000);
        ledger.set_block_timestamp(200, 2_000);

        let metrics = Arc::new(IndexerMetrics::new());
        let resolver =
            TimestampResolver::new(Arc::clone(&ledger) as Arc<dyn Ledger>, 4, metrics);

        let resolved = resolver.resolve(&[100, 200, 100, 100, 200]).await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved.get(&100).map(DateTime::timestamp),
            Some(1_000)
        );
        assert_eq!(ledger.timestamp_fetches(), 2);
    }

    #[tokio::test]
    async fn test_resolver_skips_failed_blocks() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_block_timestamp(1, 10);
        ledger.fail_timestamp_for(2);

        let metrics = Arc::new(IndexerMetrics::new());
        let resolver = TimestampResolver::new(
            Arc::clone(&ledger) as Arc<dyn Ledger>,
            4,
            Arc::clone(&metrics),
        );

        let resolved = resolver.resolve(&[1, 2]).await;

        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key(&1));
        assert_eq!(metrics.timestamp_failures(), 1);
    }

    #[tokio::test]
    async fn test_resolver_empty_input() {
        let ledger = Arc::new(MockLedger::new());
        let metrics = Arc::new(IndexerMetrics::new());
        let resolver = TimestampResolver::new(ledger as Arc<dyn Ledger>, 4, metrics);

        let resolved = resolver.resolve(&[]).await;
        assert!(resolved.is_empty());
    }
}
