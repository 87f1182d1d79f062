//! Delay strategies between poll attempts.

use std::fmt::Debug;
use std::time::Duration;

/// Strategy deciding how long to wait after a non-terminal observation.
///
/// `attempt` is the zero-based index of the attempt that just completed.
pub trait Backoff: Send + Sync + Debug {
    fn delay(&self, attempt: u32) -> Duration;
}

/// The same delay after every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    pub interval: Duration,
}

impl FixedBackoff {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Backoff for FixedBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.interval
    }
}

/// Delays growing by `multiplier` after every attempt, clamped to `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub multiplier: f64,
    pub max: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            multiplier: 2.0,
            max,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let millis = self.initial.as_millis() as f64 * self.multiplier.powi(exponent);
        if !millis.is_finite() || millis >= self.max.as_millis() as f64 {
            self.max
        } else {
            Duration::from_millis(millis as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_never_changes() {
        let backoff = FixedBackoff::new(Duration::from_millis(3000));
        assert_eq!(backoff.delay(0), Duration::from_millis(3000));
        assert_eq!(backoff.delay(19), Duration::from_millis(3000));
    }

    #[test]
    fn exponential_backoff_doubles() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(30));
        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn exponential_backoff_clamps_at_max() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(backoff.delay(4), Duration::from_secs(10));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn exponential_backoff_custom_multiplier() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(1000), Duration::from_secs(60))
            .with_multiplier(1.5);
        assert_eq!(backoff.delay(2), Duration::from_millis(2250));
    }
}
