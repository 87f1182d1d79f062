//! Error types for the `meeting-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for meeting-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in meeting-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    ApiKey(ApiKeyErrorKind),
    Http(HttpErrorKind),
}

/// Errors from API key / bearer token handling.
#[derive(Debug, PartialEq)]
pub enum ApiKeyErrorKind {
    InvalidFormat,
    Missing,
}

/// Errors from HTTP client construction.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::ApiKey(kind) => write!(f, "API key error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Requests are sent by callers, so the only reqwest failure raised here is
// client construction.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
        }
    }
}

/// Helper function to create API key errors.
pub fn api_key_error(kind: ApiKeyErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::ApiKey(kind),
    }
}
