//! History indexer configuration.
//!
//! Provides configuration options for the history indexer.

use serde::{Deserialize, Serialize};

use crate::events::collector::{DEFAULT_CHUNK_SPAN, MAX_CHUNK_SPAN};
use crate::events::timestamps::DEFAULT_CONCURRENCY;

/// Configuration for the history indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Block the ledger contract was deployed at; scans start here.
    pub start_block: u64,

    /// Chunk width in blocks for log queries.
    pub chunk_span: u64,

    /// Maximum in-flight snapshot and timestamp fetches.
    pub fetch_concurrency: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            start_block: 0,
            chunk_span: DEFAULT_CHUNK_SPAN,
            fetch_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl IndexerConfig {
    /// Creates a configuration scanning from the given deployment block.
    #[must_use]
    pub fn with_start_block(start_block: u64) -> Self {
        Self {
            start_block,
            ..Default::default()
        }
    }

    /// Sets the chunk width.
    #[must_use]
    pub fn with_chunk_span(mut self, chunk_span: u64) -> Self {
        self.chunk_span = chunk_span;
        self
    }

    /// Sets the fetch concurrency.
    #[must_use]
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_span == 0 {
            return Err(ConfigError::InvalidChunkSpan);
        }

        if self.chunk_span > MAX_CHUNK_SPAN {
            return Err(ConfigError::ChunkSpanTooLarge(self.chunk_span));
        }

        if self.fetch_concurrency == 0 {
            return Err(ConfigError::InvalidFetchConcurrency);
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Chunk span must be positive.
    #[error("chunk_span must be > 0")]
    InvalidChunkSpan,

    /// Chunk span exceeds the RPC range cap.
    #[error("chunk_span {0} exceeds the maximum of {MAX_CHUNK_SPAN}")]
    ChunkSpanTooLarge(u64),

    /// Fetch concurrency must be positive.
    #[error("fetch_concurrency must be > 0")]
    InvalidFetchConcurrency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = IndexerConfig::default();
        assert_eq!(config.start_block, 0);
        assert_eq!(config.chunk_span, DEFAULT_CHUNK_SPAN);
        assert_eq!(config.fetch_concurrency, DEFAULT_CONCURRENCY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = IndexerConfig::with_start_block(1_234)
            .with_chunk_span(500)
            .with_fetch_concurrency(2);

        assert_eq!(config.start_block, 1_234);
        assert_eq!(config.chunk_span, 500);
        assert_eq!(config.fetch_concurrency, 2);
    }

    #[test]
    fn test_config_validate_zero_chunk_span() {
        let config = IndexerConfig::default().with_chunk_span(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_oversized_chunk_span() {
        let config = IndexerConfig::default().with_chunk_span(MAX_CHUNK_SPAN + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_zero_concurrency() {
        let config = IndexerConfig::default().with_fetch_concurrency(0);
        assert!(config.validate().is_err());
    }
}
