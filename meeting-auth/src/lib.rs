//! # meeting-auth
//!
//! Authentication and HTTP plumbing for the meeting-analysis client:
//! - Bearer token authentication for the FollowThrough analysis service
//! - HTTP client building with retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_auth::{
//!     api_key::{ApiKeyProvider, BearerTokenAuth},
//!     http::AuthenticatedClientBuilder,
//! };
//!
//! let auth = BearerTokenAuth::new(ApiKeyProvider::FollowThrough, token);
//! let client = AuthenticatedClientBuilder::new()
//!     .with_auth(Box::new(auth))
//!     .with_max_retries(0)
//!     .build()?;
//! ```

pub mod api_key;
pub mod error;
pub mod http;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
