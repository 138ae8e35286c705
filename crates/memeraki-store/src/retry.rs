//! Retry with exponential backoff for transient store errors.

use std::time::Duration;

use tracing::warn;

use crate::error::{Result, StoreError};

/// How often and how patiently a batch commit is retried.
///
/// Only errors for which [`StoreError::is_retryable`] holds are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Retry up to `max_attempts` times without sleeping in between.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::none()
        }
    }

    /// Wait before retry number `retry` (1-based): `min_wait * 2^(retry-1)`,
    /// capped at `max_wait`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.min_wait.saturating_mul(factor).min(self.max_wait)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T>(&self, mut op: impl FnMut(u32) -> Result<T>) -> Result<T> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let wait = self.wait_after(&err, attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "transient store error, retrying"
                    );
                    if !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn wait_after(&self, err: &StoreError, attempt: u32) -> Duration {
        let wait = self.backoff(attempt);
        match err {
            StoreError::RateLimited {
                retry_after_secs: Some(secs),
            } => wait.max(Duration::from_secs(*secs)).min(self.max_wait),
            _ => wait,
        }
    }
}
