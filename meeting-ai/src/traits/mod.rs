//! Seams between the job flow and the outside world.

pub mod analysis;
pub mod scheduler;
