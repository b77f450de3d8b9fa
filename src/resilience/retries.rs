//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is retryable
//! - Bound the number of dispatches per logical request
//! - Produce the delay before the next attempt
//!
//! Connection errors and 5xx are retryable; every other status is final.
//! A 401 is never retried here, the refresh path owns it.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Whether an outcome is worth another attempt.
///
/// `status` is `None` when no response was received at all.
pub fn is_retryable(status: Option<StatusCode>) -> bool {
    match status {
        None => true,
        Some(status) => status.is_server_error(),
    }
}

/// Bounded retry policy with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Total dispatches allowed, first attempt included.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// True while failed attempt `attempt` leaves budget for another dispatch.
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// True if another dispatch may follow failed attempt `attempt`.
    pub fn should_retry(&self, attempt: u32, status: Option<StatusCode>) -> bool {
        self.has_attempts_left(attempt) && is_retryable(status)
    }

    /// Delay after failed attempt `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        calculate_backoff(attempt, base_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
    }
}
