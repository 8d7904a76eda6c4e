//! Resource fetcher trait and error types
//!
//! A fetcher turns an account identifier into one [`RawReading`]. Retry,
//! backoff and transport details are the fetcher's business; the sampler
//! treats any error as a single missed sample.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Sampler                              │
//! │   - fetch() once per iteration       │
//! └──────────────────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────────────────┐
//! │ trait ResourceFetcher                │
//! │   - fetch(account) -> RawReading     │
//! └──────────────────────────────────────┘
//!          │
//!          ▼
//!     ┌──────────┐
//!     │   Tron   │
//!     │ HTTP API │
//!     └──────────┘
//! ```

pub mod tron;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawReading;

pub use tron::{validate_address, TronFetcher};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when fetching a reading
#[derive(Error, Debug)]
pub enum FetchError {
    /// Address failed format validation
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Node returned a non-success status
    #[error("API error: {0}")]
    ApiError(String),

    /// Failed to parse node response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Every attempt failed; carries the last failure
    #[error("Failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::NetworkError("Request timed out".to_string())
        } else if err.is_connect() {
            FetchError::NetworkError("Connection failed".to_string())
        } else if err.is_status() {
            match err.status() {
                Some(status) => FetchError::ApiError(format!("HTTP {}", status)),
                None => FetchError::NetworkError(err.to_string()),
            }
        } else if err.is_decode() {
            FetchError::ParseError(err.to_string())
        } else {
            FetchError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::ParseError(err.to_string())
    }
}

// ============================================================================
// Fetcher Trait
// ============================================================================

/// Source of raw resource readings for an account
///
/// Implement this trait to sample from something other than a TRON node
/// (tests use an in-memory scripted fetcher).
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Short identifier used in log lines
    fn fetcher_id(&self) -> &'static str;

    /// Fetch the current reading for `account`
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when no reading could be obtained after the
    /// fetcher's own retry policy has run out.
    async fn fetch(&self, account: &str) -> Result<RawReading, FetchError>;
}

#[async_trait]
impl<T: ResourceFetcher + ?Sized> ResourceFetcher for std::sync::Arc<T> {
    fn fetcher_id(&self) -> &'static str {
        (**self).fetcher_id()
    }

    async fn fetch(&self, account: &str) -> Result<RawReading, FetchError> {
        (**self).fetch(account).await
    }
}

// ============================================================================
// Tests
// ============================================================================
