//! Keeper service configuration.
//!
//! Provides configuration options for the keeper service.

use serde::{Deserialize, Serialize};

/// Minimum accepted gas buffer, i.e. a 1.2x safety multiplier.
pub const MIN_GAS_BUFFER_PERCENT: u64 = 20;

/// Configuration for the keeper service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Seconds to sleep between ticks.
    pub poll_interval_secs: u64,

    /// Percentage added on top of the gas estimate before submission.
    pub gas_buffer_percent: u64,

    /// Maximum in-flight snapshot fetches during a scan.
    pub snapshot_concurrency: usize,

    /// Seconds to wait for a submitted transaction to confirm.
    pub confirmation_timeout_secs: u64,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            gas_buffer_percent: 25,
            snapshot_concurrency: 8,
            confirmation_timeout_secs: 60,
        }
    }
}

impl KeeperConfig {
    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Sets the gas buffer percentage.
    #[must_use]
    pub fn with_gas_buffer(mut self, percent: u64) -> Self {
        self.gas_buffer_percent = percent;
        self
    }

    /// Sets the snapshot fetch concurrency.
    #[must_use]
    pub fn with_snapshot_concurrency(mut self, concurrency: usize) -> Self {
        self.snapshot_concurrency = concurrency;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        if self.gas_buffer_percent < MIN_GAS_BUFFER_PERCENT {
            return Err(ConfigError::GasBufferTooSmall(self.gas_buffer_percent));
        }

        if self.snapshot_concurrency == 0 {
            return Err(ConfigError::InvalidSnapshotConcurrency);
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid poll interval.
    #[error("poll_interval_secs must be > 0")]
    InvalidPollInterval,

    /// Gas buffer below the safety floor.
    #[error("gas_buffer_percent {0} is below the minimum of {MIN_GAS_BUFFER_PERCENT}")]
    GasBufferTooSmall(u64),

    /// Invalid snapshot concurrency.
    #[error("snapshot_concurrency must be > 0")]
    InvalidSnapshotConcurrency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = KeeperConfig::default();
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.gas_buffer_percent, 25);
        assert_eq!(config.snapshot_concurrency, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = KeeperConfig::default()
            .with_poll_interval(30)
            .with_gas_buffer(50)
            .with_snapshot_concurrency(4);

        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.gas_buffer_percent, 50);
        assert_eq!(config.snapshot_concurrency, 4);
    }

    #[test]
    fn test_config_validate_zero_poll_interval() {
        let config = KeeperConfig::default().with_poll_interval(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_gas_buffer_floor() {
        let config = KeeperConfig::default().with_gas_buffer(19);
        assert!(config.validate().is_err());

        let config = KeeperConfig::default().with_gas_buffer(MIN_GAS_BUFFER_PERCENT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_zero_concurrency() {
        let config = KeeperConfig::default().with_snapshot_concurrency(0);
        assert!(config.validate().is_err());
    }
}
