//! One handle over the submit, poll and assemble stages.

use log::*;
use std::sync::Arc;

use super::assembler::ResultAssembler;
use super::poller::{JobPoller, PollConfig};
use super::submitter::JobSubmitter;
use crate::error::{Error, FetchError};
use crate::traits::analysis::Provider;
use crate::traits::scheduler::Scheduler;
use crate::types::analysis::JobResult;
use crate::types::job::{Job, JobId, JobSnapshot, TerminalJob};
use crate::types::submission::SubmissionRequest;

/// Drives a transcript from submission to an assembled [`JobResult`].
///
/// All stages share one provider, so one connection pool serves both the
/// submit and the status requests.
pub struct JobClient {
    provider: Arc<dyn Provider>,
    submitter: JobSubmitter,
    poller: JobPoller,
    assembler: ResultAssembler,
}

impl JobClient {
    pub fn new(provider: Arc<dyn Provider>, config: PollConfig) -> Self {
        Self {
            submitter: JobSubmitter::new(Arc::clone(&provider)),
            poller: JobPoller::new(Arc::clone(&provider), config),
            assembler: ResultAssembler::new(),
            provider,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.poller = self.poller.with_scheduler(scheduler);
        self
    }

    pub fn poll_config(&self) -> &PollConfig {
        self.poller.config()
    }

    pub async fn submit(&self, request: &SubmissionRequest) -> Result<Job, Error> {
        self.submitter.submit(request).await
    }

    pub async fn poll(&self, job_id: &JobId) -> Result<TerminalJob, Error> {
        self.poller.poll(job_id).await
    }

    pub fn assemble(&self, job: &TerminalJob) -> Result<JobResult, Error> {
        self.assembler.assemble(job)
    }

    /// Single status lookup, without waiting or retrying.
    pub async fn fetch_status(&self, job_id: &JobId) -> Result<JobSnapshot, Error> {
        let payload = self.provider.fetch(job_id).await.map_err(|e| match e {
            FetchError::Transient(e) => Error::Unavailable(e),
            FetchError::Rejected { status, message } => Error::FetchRejected {
                job_id: job_id.clone(),
                status,
                message,
            },
        })?;

        Ok(JobSnapshot::from_payload(&payload).map_err(|e| e.for_job(job_id))?)
    }

    /// Submit `request`, wait for the job to finish and assemble its result.
    pub async fn run(&self, request: &SubmissionRequest) -> Result<JobResult, Error> {
        let job = self.submit(request).await?;
        let terminal = self.poll(&job.id).await?;
        info!(
            "Job {} reached {} after {} attempt(s)",
            terminal.id, terminal.status, terminal.attempts
        );
        self.assemble(&terminal)
    }
}
