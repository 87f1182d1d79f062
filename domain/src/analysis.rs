//! Meeting analysis operations backed by the FollowThrough service.

use crate::error::{Error, InternalErrorKind};
use crate::gateway::follow_through::FollowThroughClient;
use log::*;
use meeting_ai::jobs::{Backoff, ExponentialBackoff, FixedBackoff};
use meeting_ai::types::job::JobSnapshot;
use meeting_ai::types::submission::SubmissionRequest;
use meeting_ai::{Job, JobClient, JobId, JobResult, PollConfig};
use service::config::{Config, PollBackoff};
use std::sync::Arc;

/// Build a job client talking to the configured FollowThrough endpoint.
pub fn job_client(config: &Config) -> Result<JobClient, Error> {
    let gateway = FollowThroughClient::new(config)?;
    Ok(JobClient::new(Arc::new(gateway), poll_config(config)))
}

/// Translate the poll settings from the process configuration.
pub fn poll_config(config: &Config) -> PollConfig {
    let backoff: Arc<dyn Backoff> = match config.poll_backoff {
        PollBackoff::Fixed => Arc::new(FixedBackoff::new(config.poll_interval())),
        PollBackoff::Exponential => Arc::new(ExponentialBackoff::new(
            config.poll_interval(),
            config.poll_max_interval(),
        )),
    };

    let poll_config = PollConfig::default()
        .with_max_attempts(config.poll_max_attempts)
        .with_backoff(backoff)
        .with_recovery_delay(config.poll_recovery_delay());

    match config.poll_time_budget() {
        Some(budget) => poll_config.with_time_budget(budget),
        None => poll_config,
    }
}

/// Submit a transcript and return the newly created job without waiting for it.
pub async fn submit_meeting(config: &Config, request: &SubmissionRequest) -> Result<Job, Error> {
    let client = job_client(config)?;
    Ok(client.submit(request).await?)
}

/// Look up a job's current status once.
pub async fn check_status(config: &Config, job_id: &str) -> Result<JobSnapshot, Error> {
    let job_id = parse_job_id(job_id)?;
    let client = job_client(config)?;
    Ok(client.fetch_status(&job_id).await?)
}

/// Submit a transcript, wait for the analysis to finish and return the assembled result.
pub async fn analyze_meeting(
    config: &Config,
    request: &SubmissionRequest,
) -> Result<JobResult, Error> {
    let client = job_client(config)?;
    let result = client.run(request).await?;
    debug!("Analysis of job {} finished as {}", result.job_id(), result.status());
    Ok(result)
}

fn parse_job_id(job_id: &str) -> Result<JobId, Error> {
    JobId::new(job_id).ok_or_else(|| {
        warn!("Rejected blank job identifier");
        Error::internal(InternalErrorKind::Invalid, "job identifier is empty")
    })
}
