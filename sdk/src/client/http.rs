//! HTTP client implementation.
//!
//! Provides the gateway client used to read payment state and event logs
//! from the ledger and to submit execution transactions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::config::ClientConfig;
use super::error::ClientError;
use crate::ledger::Ledger;
use crate::types::{Address, ExecuteCall, RawEvent, RawEventKind, Receipt,
    ScheduledPaymentSnapshot, TxHash};

/// Gateway error response format.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Gateway error details.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Payment count response.
#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// Single payment response.
#[derive(Debug, Deserialize)]
struct PaymentResponse {
    payment: ScheduledPaymentSnapshot,
}

/// Events list response.
#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<RawEvent>,
}

/// Block head response.
#[derive(Debug, Deserialize)]
struct BlockNumberResponse {
    number: u64,
}

/// Block timestamp response.
#[derive(Debug, Deserialize)]
struct BlockTimestampResponse {
    timestamp: u64,
}

/// Gas estimate response.
#[derive(Debug, Deserialize)]
struct EstimateResponse {
    gas: u64,
}

/// Submission response.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    tx_hash: TxHash,
}

/// Receipt response.
#[derive(Debug, Deserialize)]
struct ReceiptResponse {
    receipt: Receipt,
}

/// Execution submission request body.
#[derive(Debug, Serialize)]
struct SubmitRequest {
    payment_id: u64,
    gas_limit: u64,
}

/// HTTP client for the ledger gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = config.api_key {
            if let Ok(value) = HeaderValue::from_str(api_key) {
                headers.insert("X-API-Key", value);
            }
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { config, http })
    }

    /// Creates a new client with the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Makes a GET request to the given path.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.config.base_url, path);
        self.request_with_retry(|| self.http.get(&url)).await
    }

    /// Makes a POST request with a JSON body to the given path.
    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.config.base_url, path);
        self.request_with_retry(|| self.http.post(&url).json(body))
            .await
    }

    /// Makes a request with retry logic.
    async fn request_with_retry<T, F>(&self, request_fn: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            let response = request_fn().send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        let body = resp
                            .text()
                            .await
                            .map_err(|e| ClientError::Deserialization(e.to_string()))?;

                        return serde_json::from_str(&body)
                            .map_err(|e| ClientError::Deserialization(e.to_string()));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse().ok());

                        if retry_count < self.config.max_retries {
                            let wait_time = retry_after.unwrap_or(1);
                            tokio::time::sleep(Duration::from_secs(wait_time)).await;
                            retry_count += 1;
                            continue;
                        }

                        return Err(ClientError::RateLimited { retry_after });
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ClientError::NotFound("resource".to_string()));
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ClientError::Unauthorized);
                    }

                    let body = resp.text().await.unwrap_or_default();
                    if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(&body) {
                        return Err(ClientError::Api {
                            code: error_resp.error.code,
                            message: error_resp.error.message,
                        });
                    }

                    return Err(ClientError::Api {
                        code: status.as_str().to_string(),
                        message: body,
                    });
                }
                Err(e) => {
                    if e.is_timeout() && retry_count < self.config.max_retries {
                        retry_count += 1;
                        tokio::time::sleep(Duration::from_millis(100 * (1 << retry_count))).await;
                        last_error = Some(ClientError::from(e));
                        continue;
                    }
                    return Err(ClientError::from(e));
                }
            }
        }

        Err(last_error.unwrap_or(ClientError::Timeout))
    }
}

#[async_trait]
impl Ledger for GatewayClient {
    async fn payment_count(&self) -> Result<u64, ClientError> {
        let response: CountResponse = self.get("/payments/count").await?;
        Ok(response.count)
    }

    async fn payment(&self, id: u64) -> Result<ScheduledPaymentSnapshot, ClientError> {
        let response: PaymentResponse = self.get(&format!("/payments/{}", id)).await?;
        Ok(response.payment)
    }

    async fn events(
        &self,
        kind: RawEventKind,
        from_block: u64,
        to_block: u64,
        owner: Option<Address>,
    ) -> Result<Vec<RawEvent>, ClientError> {
        let mut path = format!(
            "/events?kind={}&from_block={}&to_block={}",
            kind.as_str(),
            from_block,
            to_block
        );
        if let Some(owner) = owner {
            path.push_str(&format!("&owner={}", owner));
        }

        let response: EventsResponse = self.get(&path).await?;
        Ok(response.events)
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        let response: BlockNumberResponse = self.get("/blocks/head").await?;
        Ok(response.number)
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ClientError> {
        let response: BlockTimestampResponse =
            self.get(&format!("/blocks/{}/timestamp", block)).await?;
        Ok(response.timestamp)
    }

    async fn estimate_execution(&self, call: &ExecuteCall) -> Result<u64, ClientError> {
        let response: EstimateResponse = self.post("/executions/estimate", call).await?;
        Ok(response.gas)
    }

    async fn submit_execution(
        &self,
        call: &ExecuteCall,
        gas_limit: u64,
    ) -> Result<TxHash, ClientError> {
        let body = SubmitRequest {
            payment_id: call.payment_id,
            gas_limit,
        };
        let response: SubmitResponse = self.post("/executions", &body).await?;
        Ok(response.tx_hash)
    }

    async fn confirmation(&self, tx_hash: &TxHash) -> Result<Receipt, ClientError> {
        let response: ReceiptResponse = self
            .get(&format!("/executions/{}/receipt", tx_hash))
            .await?;
        Ok(response.receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let config = ClientConfig::new("https://gateway.example.com");
        let client = GatewayClient::new(config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_base_url() {
        let client = GatewayClient::with_base_url("https://gateway.example.com");
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_invalid_config() {
        let config = ClientConfig::new("");
        let client = GatewayClient::new(config);
        assert!(client.is_err());
    }

    #[test]
    fn test_client_config_access() {
        let config = ClientConfig::new("https://gateway.example.com").with_api_key("test-key");
        let client = GatewayClient::new(config).expect("client creation");
        assert_eq!(client.config().base_url, "https://gateway.example.com");
        assert_eq!(client.config().api_key, Some("test-key".to_string()));
    }
}
