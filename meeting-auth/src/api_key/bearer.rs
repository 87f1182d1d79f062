//! Standard Bearer token authentication.

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use super::{ApiKeyProvider, ProviderAuth};
use crate::error::{api_key_error, ApiKeyErrorKind, Error, ErrorKind};

/// Standard Bearer token authentication.
///
/// Uses the standard `Authorization: Bearer <token>` header pattern. The token
/// is opaque to this crate; it is never inspected beyond rejecting blanks.
pub struct BearerTokenAuth {
    provider: ApiKeyProvider,
    token: SecretString,
}

impl BearerTokenAuth {
    /// Create a new Bearer token authenticator.
    pub fn new(provider: ApiKeyProvider, token: SecretString) -> Self {
        Self { provider, token }
    }

    /// Get a reference to the token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }
}

impl ProviderAuth for BearerTokenAuth {
    fn provider(&self) -> ApiKeyProvider {
        self.provider
    }

    fn authorization_header(&self) -> Result<(HeaderName, HeaderValue), Error> {
        let token = self.token.expose_secret().trim();
        if token.is_empty() {
            return Err(api_key_error(
                ApiKeyErrorKind::Missing,
                "Bearer token is empty",
            ));
        }

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::ApiKey(ApiKeyErrorKind::InvalidFormat),
        })?;
        value.set_sensitive(true);

        Ok((AUTHORIZATION, value))
    }
}
