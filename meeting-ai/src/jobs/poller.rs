//! Polling a submitted job until it reaches a terminal status.

use log::*;
use std::sync::Arc;
use std::time::Duration;

use super::backoff::{Backoff, FixedBackoff};
use crate::error::{Error, FetchError, PollTimeoutError};
use crate::traits::analysis::Provider;
use crate::traits::scheduler::{Scheduler, TokioScheduler};
use crate::types::job::{JobId, JobSnapshot, PollAttempt, TerminalJob};

/// Default number of status fetches before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
/// Default wait after a non-terminal observation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
/// Default wait after a transient fetch failure.
pub const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_millis(5000);

/// Attempt and time budget for one poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Status fetches allowed, counting transient failures.
    pub max_attempts: u32,
    /// Wait after an attempt that observed a non-terminal status.
    pub backoff: Arc<dyn Backoff>,
    /// Wait after an attempt that failed transiently.
    pub recovery_delay: Duration,
    /// Optional wall-clock limit for the whole loop.
    pub time_budget: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Arc::new(FixedBackoff::new(DEFAULT_POLL_INTERVAL)),
            recovery_delay: DEFAULT_RECOVERY_DELAY,
            time_budget: None,
        }
    }
}

impl PollConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_recovery_delay(mut self, recovery_delay: Duration) -> Self {
        self.recovery_delay = recovery_delay;
        self
    }

    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = Some(time_budget);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_attempts == 0 {
            return Err(Error::Configuration(
                "poll max_attempts must be at least 1".to_string(),
            ));
        }
        if self.time_budget == Some(Duration::ZERO) {
            return Err(Error::Configuration(
                "poll time budget must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the poll loop stands.
enum PollState {
    /// Nothing fetched yet.
    Pending,
    /// About to issue the attempt with this zero-based index.
    Polling { attempt: u32 },
    /// A terminal status was observed; no further fetches happen.
    Terminal(TerminalJob),
}

/// Bookkeeping for a single call to [`JobPoller::poll`].
struct PollRun {
    started: Duration,
    history: Vec<PollAttempt>,
    last_seen: Option<JobSnapshot>,
}

/// Repeatedly fetches a job's status until it is terminal or the budget runs out.
///
/// Each call to [`JobPoller::poll`] owns its attempt counter and start time, so
/// one poller can serve many jobs concurrently without shared mutable state.
/// Abandoning the returned future at a suspension point stops polling; the
/// remote job keeps running.
pub struct JobPoller {
    provider: Arc<dyn Provider>,
    config: PollConfig,
    scheduler: Arc<dyn Scheduler>,
}

impl JobPoller {
    pub fn new(provider: Arc<dyn Provider>, config: PollConfig) -> Self {
        Self {
            provider,
            config,
            scheduler: Arc::new(TokioScheduler::new()),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `job_id` until a terminal status is observed.
    ///
    /// Transient fetch failures consume an attempt and are followed by the
    /// recovery delay. Non-terminal observations are followed by the backoff
    /// delay. No delay follows the final attempt.
    pub async fn poll(&self, job_id: &JobId) -> Result<TerminalJob, Error> {
        self.config.validate()?;

        let mut run = PollRun {
            started: self.scheduler.now(),
            history: Vec::new(),
            last_seen: None,
        };
        let mut state = PollState::Pending;

        loop {
            state = match state {
                PollState::Pending => {
                    debug!(
                        "Polling job {} (max {} attempts)",
                        job_id, self.config.max_attempts
                    );
                    PollState::Polling { attempt: 0 }
                }
                PollState::Polling { attempt } => self.step(job_id, attempt, &mut run).await?,
                PollState::Terminal(job) => return Ok(job),
            };
        }
    }

    /// Issue one attempt and, unless it was terminal or the last one, wait.
    async fn step(
        &self,
        job_id: &JobId,
        attempt: u32,
        run: &mut PollRun,
    ) -> Result<PollState, Error> {
        let elapsed = self.scheduler.now().saturating_sub(run.started);
        if attempt >= self.config.max_attempts || self.budget_spent(elapsed) {
            return Err(self.timed_out(job_id, attempt, elapsed, run.last_seen));
        }

        let wait = match self.provider.fetch(job_id).await {
            Ok(payload) => {
                let snapshot =
                    JobSnapshot::from_payload(&payload).map_err(|e| e.for_job(job_id))?;
                debug!(
                    "Job {} attempt {}/{}: {} ({}%)",
                    job_id,
                    attempt + 1,
                    self.config.max_attempts,
                    snapshot.status,
                    snapshot.progress
                );
                run.history.push(PollAttempt {
                    index: attempt,
                    elapsed,
                    observed: Some(snapshot.status),
                });

                if snapshot.status.is_terminal() {
                    self.log_finished(job_id, &run.history);
                    return Ok(PollState::Terminal(TerminalJob {
                        id: job_id.clone(),
                        status: snapshot.status,
                        progress: snapshot.progress,
                        attempts: attempt + 1,
                        payload,
                    }));
                }

                run.last_seen = Some(snapshot);
                self.config.backoff.delay(attempt)
            }
            Err(FetchError::Transient(e)) => {
                warn!(
                    "Job {} attempt {}/{} failed: {}",
                    job_id,
                    attempt + 1,
                    self.config.max_attempts,
                    e
                );
                run.history.push(PollAttempt {
                    index: attempt,
                    elapsed,
                    observed: None,
                });
                self.config.recovery_delay
            }
            Err(FetchError::Rejected { status, message }) => {
                warn!(
                    "Job {} status fetch rejected with HTTP {}: {}",
                    job_id, status, message
                );
                return Err(Error::FetchRejected {
                    job_id: job_id.clone(),
                    status,
                    message,
                });
            }
        };

        let next = attempt + 1;
        if next < self.config.max_attempts {
            let now = self.scheduler.now().saturating_sub(run.started);
            if self.budget_spent(now + wait) {
                return Err(self.timed_out(job_id, next, now, run.last_seen));
            }
            trace!("Job {} waiting {:?} before next attempt", job_id, wait);
            self.scheduler.sleep(wait).await;
        }
        Ok(PollState::Polling { attempt: next })
    }

    fn budget_spent(&self, elapsed: Duration) -> bool {
        self.config
            .time_budget
            .is_some_and(|budget| elapsed >= budget)
    }

    fn timed_out(
        &self,
        job_id: &JobId,
        attempts: u32,
        elapsed: Duration,
        last_seen: Option<JobSnapshot>,
    ) -> Error {
        let err = PollTimeoutError {
            job_id: job_id.clone(),
            attempts,
            elapsed,
            last_status: last_seen.map(|s| s.status),
            last_progress: last_seen.map(|s| s.progress),
        };
        warn!("Giving up on job {}: {}", job_id, err);
        err.into()
    }

    fn log_finished(&self, job_id: &JobId, history: &[PollAttempt]) {
        let transient = history.iter().filter(|a| a.observed.is_none()).count();
        if let Some(last) = history.last() {
            info!(
                "Job {} reached {} after {} attempt(s) in {:?} ({} transient failure(s))",
                job_id,
                last.observed.map(|s| s.as_str()).unwrap_or("unknown"),
                history.len(),
                last.elapsed,
                transient
            );
        }
    }
}
