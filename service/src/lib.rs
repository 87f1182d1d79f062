//! Process-level configuration and logging shared by the FollowThrough client binaries.

pub mod config;
pub mod logging;
