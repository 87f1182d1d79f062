//! Types describing a remote analysis job and its observed state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MalformedResultError;

/// Opaque identifier assigned by the remote service (the `sessionId`).
///
/// Never empty: construction trims surrounding whitespace and rejects blanks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processing status of a remote analysis job.
///
/// Jobs progress Pending → Processing → Completed or Failed. The two last
/// states are terminal: once observed, the job is never polled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job status `{}`", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(status: &str) -> Result<JobStatus, Self::Err> {
        match status.trim().to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(UnknownStatus(status.to_string())),
        }
    }
}

/// A submitted job as known to the caller.
///
/// `created_at` is stamped locally when the submission is acknowledged; the
/// remote service reports no creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

/// Status and progress decoded from a single poll response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub progress: u8,
}

impl JobSnapshot {
    /// Decode the status envelope of a poll response.
    ///
    /// The payload must be a JSON object with a recognizable `status`.
    /// A missing or null `progress` reads as 0; numeric progress is rounded
    /// and clamped into 0..=100.
    pub fn from_payload(payload: &Value) -> Result<Self, MalformedResultError> {
        let object = payload
            .as_object()
            .ok_or_else(|| MalformedResultError::new("poll response is not a JSON object"))?;

        let status = match object.get("status") {
            Some(Value::String(status)) => status
                .parse::<JobStatus>()
                .map_err(|e| MalformedResultError::field("status", e.to_string()))?,
            Some(Value::Null) | None => {
                return Err(MalformedResultError::field("status", "missing"));
            }
            Some(other) => {
                return Err(MalformedResultError::field(
                    "status",
                    format!("expected a string, found {}", other),
                ));
            }
        };

        let progress = match object.get("progress") {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(value) => value.round().clamp(0.0, 100.0) as u8,
                None => 0,
            },
            Some(other) => {
                return Err(MalformedResultError::field(
                    "progress",
                    format!("expected a number, found {}", other),
                ));
            }
        };

        Ok(Self { status, progress })
    }
}

/// Ephemeral record of one status check, used for budget accounting and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollAttempt {
    /// Zero-based attempt index.
    pub index: u32,
    /// Time since polling started when the fetch was issued.
    pub elapsed: Duration,
    /// `None` when the fetch failed transiently.
    pub observed: Option<JobStatus>,
}

/// A job observed in a terminal state, with the raw payload that carried it.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalJob {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    /// Number of status fetches it took to observe the terminal state.
    pub attempts: u32,
    pub payload: Value,
}
