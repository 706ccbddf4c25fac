use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{ApiError, ApiResult};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Exponential backoff for server and network failures.
///
/// Defaults: at most 3 attempts, delays of 1s, 2s, 4s... capped at 30s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// `attempts` is the number of attempts already made.
    ///
    /// Client errors (4xx) and cancelled calls are never retried.
    pub fn should_retry(&self, attempts: u32, err: &ApiError) -> bool {
        attempts < self.max_attempts
            && !err.is_cancelled()
            && (err.is_server_error() || err.is_network_error())
    }

    /// Delay before retrying; `attempt` is the 0-based index of the failed attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis().min(u64::MAX as u128) as u64;
        let cap = self.max_delay.as_millis().min(u64::MAX as u128) as u64;
        // base * 2^attempt
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(base.saturating_mul(factor).min(cap))
    }

    pub fn decide(&self, attempts: u32, err: &ApiError) -> Decision {
        if self.should_retry(attempts, err) {
            Decision::Retry {
                delay: self.backoff_delay(attempts.saturating_sub(1)),
            }
        } else {
            Decision::Fail
        }
    }

    /// Run `call` until it succeeds or the policy gives up.
    ///
    /// `call` receives the 0-based attempt index.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> ApiResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempts = 0u32;
        loop {
            let err = match call(attempts).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            attempts += 1;
            match self.decide(attempts, &err) {
                Decision::Retry { delay } => {
                    debug!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        http_status = err.status_code(),
                        "retrying after failure: {}",
                        err.message()
                    );
                    tokio::time::sleep(delay).await;
                }
                Decision::Fail => {
                    if attempts > 1 {
                        warn!(attempts, http_status = err.status_code(), "giving up: {}", err.message());
                    }
                    return Err(err);
                }
            }
        }
    }
}
