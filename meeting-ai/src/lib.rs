//! Meeting AI abstraction layer for asynchronous transcript analysis jobs.
//!
//! This crate provides a provider-agnostic client for long-running analysis
//! jobs exposed by a remote service:
//! - Submitting a transcript with metadata and receiving a job identifier
//! - Polling the job until it reaches a terminal state, with pluggable backoff
//! - Normalizing the terminal payload into typed topics, action items,
//!   summary, sentiment, and retrieved-context documents
//!
//! Transport lives behind [`traits::analysis::Provider`], and time behind
//! [`traits::scheduler::Scheduler`], so the whole flow runs unchanged against a
//! mock provider and a virtual clock.

pub mod error;
pub mod jobs;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use jobs::{JobClient, JobPoller, JobSubmitter, PollConfig, ResultAssembler};
pub use types::analysis::JobResult;
pub use types::job::{Job, JobId, JobStatus};
