//! The submit → poll → assemble job flow.

mod assembler;
mod backoff;
mod client;
mod poller;
mod submitter;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::ResultAssembler;
pub use backoff::{Backoff, ExponentialBackoff, FixedBackoff};
pub use client::JobClient;
pub use poller::{JobPoller, PollConfig};
pub use submitter::JobSubmitter;
