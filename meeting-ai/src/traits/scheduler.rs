//! Time source used by the poll loop.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Suspends the poll loop and reports elapsed time.
///
/// Production code uses [`TokioScheduler`]; tests drive the same loop with a
/// virtual clock and inspect the requested delays.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Suspend the current task. Dropping the future abandons the wait.
    async fn sleep(&self, duration: Duration);

    /// Monotonic time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Scheduler backed by the tokio timer.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    origin: Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock for tests: sleeping advances time instantly and is recorded.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct VirtualScheduler {
    state: std::sync::Mutex<VirtualClock>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct VirtualClock {
    now: Duration,
    sleeps: Vec<Duration>,
}

#[cfg(test)]
impl VirtualScheduler {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.state.lock().unwrap().now += by;
    }
}

#[cfg(test)]
#[async_trait]
impl Scheduler for VirtualScheduler {
    async fn sleep(&self, duration: Duration) {
        {
            let mut clock = self.state.lock().unwrap();
            clock.now += duration;
            clock.sleeps.push(duration);
        }
        // Let other polls sharing this clock take their turn.
        tokio::task::yield_now().await;
    }

    fn now(&self) -> Duration {
        self.state.lock().unwrap().now
    }
}
