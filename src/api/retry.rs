//! Retry policy for transient API errors
//!
//! The API reports rate limiting inside a normal JSON envelope, so retries are
//! driven by the envelope's error code rather than the HTTP status.
//!
//! | Code | Meaning | Action |
//! |------|---------|--------|
//! | 6 | Too many requests per second | Retry with backoff |
//! | 10 | Internal server error / overload | Retry with backoff |
//! | 28 | Concurrent requests limit | Retry with backoff |
//! | other | Permanent for this request | Give up immediately |

use rand::Rng;
use std::time::Duration;

/// Error codes that are safe to retry unchanged
pub const RETRYABLE_ERROR_CODES: [i64; 3] = [6, 10, 28];

/// Returns true if the API error code describes a transient condition
pub fn is_retryable(code: i64) -> bool {
    RETRYABLE_ERROR_CODES.contains(&code)
}

/// How a call reacts to retryable error codes
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of requests allowed for one call (`None` is unbounded)
    pub max_attempts: Option<u32>,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Upper bound for a single delay
    pub max_delay: Duration,

    /// Growth factor applied per retry
    pub multiplier: f64,

    /// Draw each delay uniformly from `[0, delay]`
    pub jitter: bool,

    /// Deadline for one logical call, retries included
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(10),
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl RetryPolicy {
    /// Fixed delay, unbounded attempts, no deadline
    ///
    /// This loops for as long as the server keeps answering with a retryable
    /// code.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            base_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
            jitter: false,
            timeout: None,
        }
    }

    /// Returns true if another request may follow `attempts` requests
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    /// Delay to wait before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let ceiling = self.backoff(retry);
        if !self.jitter || ceiling.is_zero() {
            return ceiling;
        }

        let millis = ceiling.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
    }

    /// Deterministic (pre-jitter) backoff for retry number `retry`
    fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(32) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let scaled = self.base_delay.as_secs_f64() * factor;

        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(scaled)
        }
    }
}
