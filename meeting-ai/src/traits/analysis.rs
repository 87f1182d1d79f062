//! Analysis job provider trait.

use crate::error::{FetchError, SubmissionError};
use crate::types::job::JobId;
use crate::types::submission::{SubmissionReceipt, SubmissionRequest};
use async_trait::async_trait;
use serde_json::Value;

/// Abstraction for a remote service that runs transcript analysis as an
/// asynchronous job.
///
/// Implementations own the transport: authentication, URLs, and classifying
/// HTTP failures into [`SubmissionError`] and [`FetchError`]. Interpreting the
/// responses is left to the job submitter, poller, and assembler, so a provider
/// stays a thin adapter. Implementations must tolerate concurrent calls for
/// independent jobs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Submit a transcript for analysis and return the raw acknowledgement.
    ///
    /// Called exactly once per submission; never retried by the caller.
    async fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> std::result::Result<SubmissionReceipt, SubmissionError>;

    /// Fetch the current status document for a job.
    ///
    /// Returns the decoded JSON body of a 2xx response. Network failures and
    /// 5xx/408/429 answers must be reported as [`FetchError::Transient`].
    async fn fetch(&self, job_id: &JobId) -> std::result::Result<Value, FetchError>;
}
