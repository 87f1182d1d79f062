//! Submission of transcripts as analysis jobs.

use chrono::Utc;
use log::*;
use std::sync::Arc;

use crate::error::{Error, SubmissionError, SubmissionErrorKind};
use crate::traits::analysis::Provider;
use crate::types::job::{Job, JobId, JobStatus};
use crate::types::submission::SubmissionRequest;

/// Sends a transcript to the provider and turns the acknowledgement into a [`Job`].
///
/// Never retries: any failure is surfaced immediately and the caller decides
/// whether to resubmit.
pub struct JobSubmitter {
    provider: Arc<dyn Provider>,
}

impl JobSubmitter {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Submit `request` and return the freshly created, non-terminal job.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<Job, Error> {
        if request.transcript.trim().is_empty() {
            return Err(
                SubmissionError::new(SubmissionErrorKind::InvalidRequest, "transcript is empty")
                    .into(),
            );
        }

        debug!(
            "Submitting transcript ({} bytes, title: {:?}) for analysis",
            request.transcript.len(),
            request.title()
        );

        let receipt = self.provider.submit(request).await.map_err(|e| {
            warn!("Analysis submission failed: {}", e);
            e
        })?;

        let id = receipt
            .session_id
            .and_then(JobId::new)
            .ok_or_else(|| {
                SubmissionError::new(
                    SubmissionErrorKind::MissingIdentifier,
                    "response is missing `sessionId`",
                )
            })?;

        let status = match receipt.status {
            None => JobStatus::Pending,
            Some(status) => status.parse::<JobStatus>().map_err(|e| {
                SubmissionError::new(SubmissionErrorKind::InvalidResponse, e.to_string())
                    .with_source(e)
            })?,
        };

        if status.is_terminal() {
            return Err(SubmissionError::new(
                SubmissionErrorKind::UnexpectedStatus,
                format!("job {} reported `{}` at submission", id, status),
            )
            .into());
        }

        info!("Submitted analysis job {} ({})", id, status);

        Ok(Job {
            id,
            status,
            progress: 0,
            created_at: Utc::now(),
        })
    }
}
