//! TRON full-node resource fetcher
//!
//! Calls `POST /wallet/getaccountresource` on a TRON full node (TronGrid by
//! default) and maps the response onto a [`RawReading`].
//!
//! # Retries
//!
//! Each fetch makes up to [`MAX_ATTEMPTS`] requests, sleeping between
//! attempts with exponential backoff starting at [`INITIAL_BACKOFF_MS`].
//! Only when every attempt fails does the caller see an error.
//!
//! # Example
//!
//! ```ignore
//! use resmon_core::services::fetcher::{ResourceFetcher, TronFetcher};
//!
//! let fetcher = TronFetcher::new("https://api.trongrid.io");
//! let reading = fetcher.fetch("TLyqzVGLV1srkB7dToTAEqgDSfPtXRJZYH").await?;
//! println!("energy: {}/{}", reading.energy_used, reading.energy_limit);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{FetchError, ResourceFetcher};
use crate::models::RawReading;

// ============================================================================
// Constants
// ============================================================================

/// Account resource endpoint path
const ACCOUNT_RESOURCE_PATH: &str = "/wallet/getaccountresource";

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Attempts per fetch
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the second attempt; doubles each time
pub const INITIAL_BACKOFF_MS: u64 = 100;

/// Length of a base58 TRON address
const ADDRESS_LENGTH: usize = 34;

// ============================================================================
// API Types
// ============================================================================

/// Request body for getaccountresource
#[derive(Debug, Serialize)]
struct AccountResourceRequest<'a> {
    address: &'a str,
    visible: bool,
}

/// Response from getaccountresource
///
/// The node leaves out fields whose value is zero, so everything defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AccountResourceResponse {
    #[serde(rename = "freeNetLimit")]
    free_net_limit: i64,
    #[serde(rename = "freeNetUsed")]
    free_net_used: i64,
    #[serde(rename = "NetLimit")]
    net_limit: i64,
    #[serde(rename = "NetUsed")]
    net_used: i64,
    #[serde(rename = "EnergyLimit")]
    energy_limit: i64,
    #[serde(rename = "EnergyUsed")]
    energy_used: i64,
}

impl From<AccountResourceResponse> for RawReading {
    fn from(resp: AccountResourceResponse) -> Self {
        RawReading {
            energy_limit: resp.energy_limit,
            energy_used: resp.energy_used,
            net_limit: resp.net_limit,
            net_used: resp.net_used,
            free_net_limit: resp.free_net_limit,
            free_net_used: resp.free_net_used,
        }
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches account resources from a TRON full node over HTTP
#[derive(Debug, Clone)]
pub struct TronFetcher {
    node_url: String,
    client: Client,
    initial_backoff: Duration,
}

impl TronFetcher {
    /// Create a fetcher for the given node URL (trailing slash is ignored)
    pub fn new(node_url: impl AsRef<str>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            node_url: node_url.as_ref().trim_end_matches('/').to_string(),
            client,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    /// Override the initial retry backoff
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Node base URL without trailing slash
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Single request, no retries
    async fn request_once(&self, account: &str) -> Result<RawReading, FetchError> {
        let url = format!("{}{}", self.node_url, ACCOUNT_RESOURCE_PATH);
        let body = AccountResourceRequest {
            address: account,
            visible: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(FetchError::ApiError(format!(
                "unexpected status code {}: {}",
                status.as_u16(),
                error_body
            )));
        }

        let response_text = response.text().await?;
        log::trace!(
            "[fetch:tron] response body: {}",
            response_text.chars().take(200).collect::<String>()
        );

        let parsed: AccountResourceResponse = serde_json::from_str(&response_text)?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl ResourceFetcher for TronFetcher {
    fn fetcher_id(&self) -> &'static str {
        "tron"
    }

    async fn fetch(&self, account: &str) -> Result<RawReading, FetchError> {
        let mut backoff = self.initial_backoff;
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.request_once(account).await {
                Ok(reading) => return Ok(reading),
                Err(e) => {
                    log::debug!(
                        "[fetch:tron] attempt {}/{} failed: {}",
                        attempt,
                        MAX_ATTEMPTS,
                        e
                    );
                    last_error = Some(e);
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }

        Err(FetchError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            last: Box::new(
                last_error.unwrap_or_else(|| FetchError::NetworkError("no attempt made".into())),
            ),
        })
    }
}

/// Check that `address` looks like a base58 TRON address
pub fn validate_address(address: &str) -> Result<(), FetchError> {
    if address.len() != ADDRESS_LENGTH {
        return Err(FetchError::InvalidAddress(format!(
            "invalid address length: expected {}, got {}",
            ADDRESS_LENGTH,
            address.len()
        )));
    }
    if !address.starts_with('T') {
        return Err(FetchError::InvalidAddress(
            "invalid address format: must start with 'T'".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
