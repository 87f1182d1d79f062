//! Exponential backoff retry policy for the HTTP middleware stack.

use std::time::{Duration, SystemTime};

use log::debug;
use reqwest_retry::{RetryDecision, RetryPolicy};

/// Exponential backoff retry policy.
///
/// Retries transient request failures with exponentially increasing delays,
/// capped at a maximum. A policy built with `max_retries == 0` never retries.
#[derive(Debug, Clone)]
pub struct ExponentialRetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl ExponentialRetryPolicy {
    /// Create a new retry policy with a one second base delay capped at a minute.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }

    /// Override the delay used before the first retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Override the upper bound on any single delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Calculate exponential backoff delay.
    fn exponential_delay(&self, n_attempts: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * 2_f64.powi(n_attempts as i32);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

impl RetryPolicy for ExponentialRetryPolicy {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            RetryDecision::DoNotRetry
        } else {
            let delay = self.exponential_delay(n_past_retries);
            debug!(
                "Retrying transient HTTP failure (retry {} of {}) in {:?}",
                n_past_retries + 1,
                self.max_retries,
                delay
            );
            RetryDecision::Retry {
                execute_after: SystemTime::now() + delay,
            }
        }
    }
}
