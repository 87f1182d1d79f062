//! Domain layer for the FollowThrough meeting analysis client.
//!
//! Wires the provider-agnostic job flow from `meeting-ai` to the FollowThrough
//! HTTP API and the process configuration from `service`, and translates
//! errors from both into [`error::Error`].

pub use meeting_ai::types::analysis::{
    ActionItem, CompletedResult, FailedResult, RetrievedDocument, Sentiment, Summary, Topic,
};
pub use meeting_ai::types::job::JobSnapshot;
pub use meeting_ai::types::submission::SubmissionRequest;
pub use meeting_ai::{Job, JobId, JobResult, JobStatus};

pub mod analysis;
pub mod error;

pub mod gateway;
