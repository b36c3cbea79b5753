//! API access layer
//!
//! This module contains everything that talks to the remote method API:
//! - The call client with token/version injection and transient-error retries
//! - The retry policy (backoff, jitter, deadline)
//! - Typed payloads for the methods the harvester uses

mod client;
mod retry;
pub mod types;

pub use client::{build_http_client, ApiClient, CallStats, DEFAULT_API_URL, DEFAULT_API_VERSION};
pub use retry::{is_retryable, RetryPolicy, RETRYABLE_ERROR_CODES};

use std::time::Duration;
use thiserror::Error;

/// Errors a single API call can end with
///
/// None of these abort a harvest: callers log them (the client already does)
/// and continue with an empty result for that call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {code} from {method}: {message}")]
    Api {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Transport error calling {method}: {source}")]
    Transport {
        method: String,
        source: reqwest::Error,
    },

    #[error("HTTP status {status} from {method}")]
    Status { method: String, status: u16 },

    #[error("Malformed response from {method}: {message}")]
    Decode { method: String, message: String },

    #[error("Invalid API URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Gave up on {method} after {attempts} attempts (last error code {code})")]
    RetriesExhausted {
        method: String,
        attempts: u32,
        code: i64,
    },

    #[error("Gave up on {method} after {elapsed:?} of retrying")]
    DeadlineExceeded { method: String, elapsed: Duration },
}

impl ApiError {
    /// Returns true if the call failed because the retry policy ran out
    pub fn is_give_up(&self) -> bool {
        matches!(
            self,
            Self::RetriesExhausted { .. } | Self::DeadlineExceeded { .. }
        )
    }
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;
