//! Clients for the external services the domain layer talks to.

pub mod follow_through;
