//! Retry with exponential backoff for read-only node calls.
//!
//! Transaction submission never goes through here: a resubmitted transaction
//! that the node already accepted comes back as a sequence-number error, not
//! as the original hash.
//!
//! ```rust
//! use aptos_txn_sdk::retry::RetryConfig;
//! use std::time::Duration;
//!
//! let config = RetryConfig::default()
//!     .with_max_retries(5)
//!     .with_delays(Duration::from_millis(100), Duration::from_secs(10));
//! assert_eq!(config.max_retries, 5);
//! ```

use crate::error::{AptosError, AptosResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Share of the backoff delay added or removed at random.
const JITTER_FACTOR: f64 = 0.5;

/// Status codes worth another attempt: timeouts, throttling and gateway
/// errors.
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// How read-only node calls are retried.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 0 disables retries.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Fail on the first error.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Backoff starts at `initial` and doubles up to `max`.
    #[must_use]
    pub fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max;
        self
    }

    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay before retry number `attempt`; attempt 0 has none.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.saturating_pow(attempt - 1);
        let capped = self.initial_delay.saturating_mul(factor).min(self.max_delay);
        if !self.jitter {
            return capped;
        }
        let spread = rand::random::<f64>() * 2.0 - 1.0;
        capped.mul_f64((1.0 + spread * JITTER_FACTOR).max(0.0))
    }

    /// Transport failures and [`RETRYABLE_STATUS_CODES`] are retried;
    /// everything else, decoding errors included, is returned as is.
    pub fn is_retryable_error(&self, error: &AptosError) -> bool {
        match error {
            AptosError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AptosError::Api { status_code, .. } => RETRYABLE_STATUS_CODES.contains(status_code),
            _ => false,
        }
    }
}

/// Runs an async operation, retrying retryable failures.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub async fn execute<F, Fut, T>(&self, operation: F) -> AptosResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AptosResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.config.max_retries || !self.config.is_retryable_error(&error)
                    {
                        return Err(error);
                    }

                    attempt += 1;
                    let delay = self.config.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error.sanitized_message(),
                        "retrying node request"
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }
}
