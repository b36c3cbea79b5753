//! API call client
//!
//! Every call goes through [`ApiClient::call`], which:
//! - appends the access token and protocol version to the parameters
//! - unwraps the `{"response": ...}` envelope into the caller's type
//! - retries the identical request on transient error codes per [`RetryPolicy`]
//! - logs and returns every other failure as an [`ApiError`]

use crate::api::retry::{is_retryable, RetryPolicy};
use crate::api::{ApiError, ApiResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use url::Url;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://api.vk.com/method/";

/// Default protocol version sent as `v`
pub const DEFAULT_API_VERSION: &str = "5.131";

/// Counters for the calls made through one client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    /// HTTP requests sent, retries included
    pub requests: u64,

    /// Requests that were repeats of a rate-limited request
    pub retries: u64,

    /// Calls that ended in an error
    pub failures: u64,
}

#[derive(Debug, Default)]
struct CallCounters {
    requests: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
}

/// Error body inside an `{"error": ...}` envelope
#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// A decoded response envelope
#[derive(Debug)]
enum Envelope {
    Response(Value),
    Error(ErrorBody),
}

/// Client for the JSON method API
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
    retry: RetryPolicy,
    counters: CallCounters,
}

/// Builds the underlying HTTP client
///
/// Timeouts apply per request; the retry policy's deadline applies on top of
/// them to a whole logical call.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl ApiClient {
    /// Creates a client for the API rooted at `api_url`
    ///
    /// # Arguments
    ///
    /// * `api_url` - Method root, e.g. `https://api.vk.com/method/`
    /// * `token` - Access token appended to every call
    /// * `version` - Protocol version appended to every call
    /// * `retry` - Policy for transient error codes
    pub fn new(
        api_url: &str,
        token: impl Into<String>,
        version: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self, ApiError> {
        let mut root = api_url.to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        let base_url = Url::parse(&root).map_err(|source| ApiError::InvalidUrl {
            url: api_url.to_string(),
            source,
        })?;

        let http = build_http_client().map_err(|source| ApiError::Transport {
            method: "<client>".to_string(),
            source,
        })?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
            version: version.into(),
            retry,
            counters: CallCounters::default(),
        })
    }

    /// Returns the retry policy in use
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns a snapshot of the call counters
    pub fn stats(&self) -> CallStats {
        CallStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Calls an API method and decodes its payload
    ///
    /// Callers treat any `Err` as "no data" for this call only; failures are
    /// already logged here.
    ///
    /// # Arguments
    ///
    /// * `method` - Method name, e.g. `wall.get`
    /// * `params` - Method parameters (token and version are added)
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self
            .base_url
            .join(method)
            .map_err(|source| self.failed(ApiError::InvalidUrl {
                url: method.to_string(),
                source,
            }))?;

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("access_token", self.token.clone()));
        query.push(("v", self.version.clone()));

        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            self.counters.requests.fetch_add(1, Ordering::Relaxed);

            let envelope = self
                .send_once(method, &url, &query)
                .await
                .map_err(|e| self.failed(e))?;

            let error = match envelope {
                Envelope::Response(payload) => {
                    return serde_json::from_value(payload).map_err(|e| {
                        self.failed(ApiError::Decode {
                            method: method.to_string(),
                            message: e.to_string(),
                        })
                    });
                }
                Envelope::Error(error) => error,
            };

            if !is_retryable(error.error_code) {
                return Err(self.failed(ApiError::Api {
                    method: method.to_string(),
                    code: error.error_code,
                    message: error.error_msg,
                }));
            }

            if !self.retry.allows_retry(attempts) {
                return Err(self.failed(ApiError::RetriesExhausted {
                    method: method.to_string(),
                    attempts,
                    code: error.error_code,
                }));
            }

            let delay = self.retry.delay_for(attempts);
            if let Some(timeout) = self.retry.timeout {
                let elapsed = started.elapsed();
                if elapsed + delay > timeout {
                    return Err(self.failed(ApiError::DeadlineExceeded {
                        method: method.to_string(),
                        elapsed,
                    }));
                }
            }

            tracing::debug!(
                method,
                code = error.error_code,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "Transient API error, retrying"
            );
            self.counters.retries.fetch_add(1, Ordering::Relaxed);
            tokio::time::sleep(delay).await;
        }
    }

    /// Sends one request and decodes the envelope
    async fn send_once(
        &self,
        method: &str,
        url: &Url,
        query: &[(&str, String)],
    ) -> ApiResult<Envelope> {
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                method: method.to_string(),
                source,
            })?;

        // Invalid UTF-8 in user content must never fail a call
        let body = String::from_utf8_lossy(&bytes);

        match parse_envelope(method, &body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Counts and logs a failed call
    fn failed(&self, error: ApiError) -> ApiError {
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(give_up = error.is_give_up(), "{}", error);
        error
    }
}

/// Splits a response body into payload or error body
fn parse_envelope(method: &str, body: &str) -> ApiResult<Envelope> {
    let decode_error = |message: String| ApiError::Decode {
        method: method.to_string(),
        message,
    };

    let mut value: Value = serde_json::from_str(body).map_err(|e| decode_error(e.to_string()))?;

    if let Some(error) = value.get_mut("error").map(Value::take) {
        let error: ErrorBody =
            serde_json::from_value(error).map_err(|e| decode_error(e.to_string()))?;
        return Ok(Envelope::Error(error));
    }

    match value.get_mut("response").map(Value::take) {
        Some(payload) => Ok(Envelope::Response(payload)),
        None => Err(decode_error(
            "envelope has neither 'response' nor 'error'".to_string(),
        )),
    }
}
