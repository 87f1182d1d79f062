//! Types shared by the job submission, polling, and assembly stages.

pub mod analysis;
pub mod job;
pub mod submission;
