//! Error types for meeting AI job operations.
//!
//! Only [`Error`] crosses the crate boundary. [`FetchError`] is what a
//! provider reports for a single status fetch; the poller absorbs its
//! transient variant and converts the rest.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::types::job::{JobId, JobStatus};

/// Universal error type returned by the job submission, polling, and assembly stages.
///
/// Every variant carries enough context (status code, last observed status and
/// progress, attempt count) for a caller to decide whether to resubmit.
#[derive(Debug)]
pub enum Error {
    /// The job could not be submitted. Never retried by this crate.
    Submission(SubmissionError),

    /// The attempt or time budget ran out before the job reached a terminal status.
    PollTimeout(PollTimeoutError),

    /// A poll response or terminal payload did not have the expected shape.
    MalformedResult(MalformedResultError),

    /// The service refused a status fetch with a non-transient client error
    /// (revoked credentials, unknown job). Retrying cannot help.
    FetchRejected {
        job_id: JobId,
        status: u16,
        message: String,
    },

    /// A one-shot status lookup failed transiently. Produced only outside the
    /// poll loop, which absorbs transient failures itself.
    Unavailable(TransientFetchError),

    /// Invalid client-side settings, such as a zero attempt budget.
    Configuration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Submission(err) => write!(f, "Submission failed: {}", err),
            Error::PollTimeout(err) => write!(f, "Polling timed out: {}", err),
            Error::MalformedResult(err) => write!(f, "Malformed result: {}", err),
            Error::FetchRejected {
                job_id,
                status,
                message,
            } => write!(
                f,
                "Status fetch for job {} rejected with HTTP {}: {}",
                job_id, status, message
            ),
            Error::Unavailable(err) => write!(f, "Service unavailable: {}", err),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Submission(err) => Some(err),
            Error::PollTimeout(err) => Some(err),
            Error::MalformedResult(err) => Some(err),
            Error::Unavailable(err) => Some(err),
            Error::FetchRejected { .. } | Error::Configuration(_) => None,
        }
    }
}

impl From<SubmissionError> for Error {
    fn from(err: SubmissionError) -> Self {
        Error::Submission(err)
    }
}

impl From<PollTimeoutError> for Error {
    fn from(err: PollTimeoutError) -> Self {
        Error::PollTimeout(err)
    }
}

impl From<MalformedResultError> for Error {
    fn from(err: MalformedResultError) -> Self {
        Error::MalformedResult(err)
    }
}

/// What went wrong while submitting a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    /// The request was rejected locally before any network call.
    InvalidRequest,
    /// The endpoint could not be reached (DNS, connect, timeout).
    Unreachable,
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// The response carried no usable job identifier.
    MissingIdentifier,
    /// The response body could not be decoded.
    InvalidResponse,
    /// The response reported a terminal status for a freshly submitted job.
    UnexpectedStatus,
}

/// Request/response failure at submit time.
#[derive(Debug)]
pub struct SubmissionError {
    pub kind: SubmissionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl SubmissionError {
    pub fn new(kind: SubmissionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SubmissionErrorKind::Status(code) => write!(f, "HTTP {}: {}", code, self.message),
            kind => write!(f, "{:?}: {}", kind, self.message),
        }
    }
}

impl StdError for SubmissionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Outcome of a failed status fetch, as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network failure, timeout, 5xx, 408 or 429. Worth retrying.
    Transient(TransientFetchError),
    /// Any other non-2xx answer.
    Rejected { status: u16, message: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transient(err) => write!(f, "{}", err),
            FetchError::Rejected { status, message } => {
                write!(f, "rejected with HTTP {}: {}", status, message)
            }
        }
    }
}

impl StdError for FetchError {}

/// Network or server error during polling.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientFetchError {
    /// HTTP status when the server answered, `None` for transport failures.
    pub status: Option<u16>,
    pub message: String,
}

impl TransientFetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for TransientFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "transient HTTP {}: {}", status, self.message),
            None => write!(f, "transient network error: {}", self.message),
        }
    }
}

impl StdError for TransientFetchError {}

/// Budget exhausted without a terminal status.
#[derive(Debug, Clone, PartialEq)]
pub struct PollTimeoutError {
    pub job_id: JobId,
    /// Number of status fetches performed, successful or not.
    pub attempts: u32,
    pub elapsed: Duration,
    /// Last non-terminal status observed, if any fetch succeeded.
    pub last_status: Option<JobStatus>,
    pub last_progress: Option<u8>,
}

impl fmt::Display for PollTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "job {} not finished after {} attempt(s) in {:?}",
            self.job_id, self.attempts, self.elapsed
        )?;
        match (self.last_status, self.last_progress) {
            (Some(status), Some(progress)) => {
                write!(f, " (last seen {} at {}%)", status, progress)
            }
            _ => write!(f, " (no status observed)"),
        }
    }
}

impl StdError for PollTimeoutError {}

/// A payload that does not match the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedResultError {
    pub job_id: Option<JobId>,
    /// Dotted path of the offending field, `None` for top-level problems.
    pub field: Option<String>,
    pub reason: String,
}

impl MalformedResultError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            job_id: None,
            field: None,
            reason: reason.into(),
        }
    }

    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            job_id: None,
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    pub fn for_job(mut self, job_id: &JobId) -> Self {
        self.job_id = Some(job_id.clone());
        self
    }
}

impl fmt::Display for MalformedResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(job_id) = &self.job_id {
            write!(f, "job {}: ", job_id)?;
        }
        match &self.field {
            Some(field) => write!(f, "field `{}`: {}", field, self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl StdError for MalformedResultError {}
