//! Credential handling for the analysis service.
//!
//! Provides the trait and implementation for authenticating requests with
//! an opaque bearer token supplied by the caller.

mod auth;
mod bearer;

pub use auth::{ApiKeyProvider, ProviderAuth};
pub use bearer::BearerTokenAuth;
