//! Client configuration.
//!
//! Provides configuration options for the ledger gateway client.

use std::time::Duration;

/// Default base URL for the ledger gateway.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8545";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum retries.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the ledger gateway.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum number of retries for failed requests.
    pub max_retries: u32,

    /// Optional API key for authenticated gateways.
    pub api_key: Option<String>,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            api_key: None,
            user_agent: format!("drip-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. A service with an
    /// invalid gateway configuration fails fast here and performs no work.
    pub fn validate(&self) -> Result<(), super::error::ClientError> {
        if self.base_url.is_empty() {
            return Err(super::error::ClientError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(super::error::ClientError::InvalidConfig(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}
