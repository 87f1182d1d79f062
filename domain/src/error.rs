//! Error types for the `domain` layer.
use meeting_ai::error::{Error as MeetingAiError, SubmissionErrorKind};
use meeting_auth::error::{Error as MeetingAuthError, ErrorKind as MeetingAuthErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error, so the typed
/// job error from `meeting-ai` (attempt count, last progress, offending field)
/// stays reachable by callers that need it.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Problems on our side of the wire.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// Missing or unusable settings (no token, bad endpoint URL, zero attempt budget).
    Config,
    /// Caller input rejected before any request was made.
    Invalid,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The service answered with a non-transient error status.
    Rejected,
    /// The job did not finish within the poll budget.
    Timeout,
    /// The service answered with a body we could not interpret.
    MalformedResponse,
    Other(String),
}

impl Error {
    pub fn internal(kind: InternalErrorKind, message: impl Into<String>) -> Self {
        Error {
            source: Some(message.into().into()),
            error_kind: DomainErrorKind::Internal(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{:?}: {}", self.error_kind, source),
            None => write!(f, "{:?}", self.error_kind),
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

// This is where we translate errors from the `meeting-ai` job layer to the `domain` layer.
impl From<MeetingAiError> for Error {
    fn from(err: MeetingAiError) -> Self {
        let error_kind = match &err {
            MeetingAiError::Submission(e) => match e.kind {
                SubmissionErrorKind::InvalidRequest => {
                    DomainErrorKind::Internal(InternalErrorKind::Invalid)
                }
                SubmissionErrorKind::Unreachable => {
                    DomainErrorKind::External(ExternalErrorKind::Network)
                }
                SubmissionErrorKind::Status(_) => {
                    DomainErrorKind::External(ExternalErrorKind::Rejected)
                }
                SubmissionErrorKind::MissingIdentifier
                | SubmissionErrorKind::InvalidResponse
                | SubmissionErrorKind::UnexpectedStatus => {
                    DomainErrorKind::External(ExternalErrorKind::MalformedResponse)
                }
            },
            MeetingAiError::PollTimeout(_) => DomainErrorKind::External(ExternalErrorKind::Timeout),
            MeetingAiError::MalformedResult(_) => {
                DomainErrorKind::External(ExternalErrorKind::MalformedResponse)
            }
            MeetingAiError::FetchRejected { .. } => {
                DomainErrorKind::External(ExternalErrorKind::Rejected)
            }
            MeetingAiError::Unavailable(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAiError::Configuration(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<MeetingAuthError> for Error {
    fn from(err: MeetingAuthError) -> Self {
        let error_kind = match &err.error_kind {
            MeetingAuthErrorKind::ApiKey(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            MeetingAuthErrorKind::Http(_) => DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to build HTTP client".to_string(),
            )),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
