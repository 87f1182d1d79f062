//! Provider authentication trait.

use reqwest::header::{HeaderName, HeaderValue};

use crate::error::Error;

/// Known API key providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyProvider {
    FollowThrough,
}

impl ApiKeyProvider {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyProvider::FollowThrough => "followthrough",
        }
    }
}

/// Trait for authenticating HTTP requests with API keys or bearer tokens.
///
/// Implementations produce the single header that must accompany every
/// request to the provider. The header value is expected to be marked
/// sensitive so it never shows up in debug output.
pub trait ProviderAuth: Send + Sync {
    /// Get the provider identifier.
    fn provider(&self) -> ApiKeyProvider;

    /// Build the authentication header attached to every request.
    fn authorization_header(&self) -> Result<(HeaderName, HeaderValue), Error>;
}
