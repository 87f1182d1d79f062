//! Authenticated HTTP client builder with middleware.

use std::time::Duration;

use log::debug;
use reqwest::header::HeaderMap;
use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::ExponentialRetryPolicy;
use crate::api_key::ProviderAuth;
use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries performed by the middleware.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: format!("meeting-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Authenticated HTTP client with middleware.
pub type AuthenticatedClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for creating authenticated HTTP clients with middleware.
///
/// Provides a fluent API for constructing HTTP clients with:
/// - Authentication installed as a sensitive default header
/// - Retry logic for transient failures
/// - Timeout configuration
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
    auth: Option<Box<dyn ProviderAuth>>,
}

impl AuthenticatedClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            auth: None,
        }
    }

    /// Set the authentication provider.
    pub fn with_auth(mut self, auth: Box<dyn ProviderAuth>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    ///
    /// Fails if the credential cannot be turned into a header or the
    /// underlying reqwest client cannot be constructed.
    pub fn build(self) -> Result<AuthenticatedClient, Error> {
        let mut headers = HeaderMap::new();
        if let Some(auth) = &self.auth {
            debug!(
                "Building HTTP client for {} (max retries: {})",
                auth.provider().as_str(),
                self.config.max_retries
            );
            let (name, value) = auth.authorization_header()?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let retry_policy = ExponentialRetryPolicy::new(self.config.max_retries);
        let client_with_middleware = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(client_with_middleware)
    }
}

impl Default for AuthenticatedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
