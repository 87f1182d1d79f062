//! FollowThrough API client for meeting transcript analysis.
//!
//! Submits transcripts with `POST {api_url}` and reads job status with
//! `GET {api_url}/{sessionId}`. Every request carries the configured bearer token.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use meeting_ai::error::{FetchError, SubmissionError, SubmissionErrorKind, TransientFetchError};
use meeting_ai::traits::analysis::Provider;
use meeting_ai::types::job::JobId;
use meeting_ai::types::submission::{SubmissionReceipt, SubmissionRequest};
use meeting_auth::api_key::{ApiKeyProvider, BearerTokenAuth};
use meeting_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use reqwest::{StatusCode, Url};
use secrecy::SecretString;
use serde_json::Value;
use service::config::Config;

/// FollowThrough API client.
///
/// Holds two clients over the same credentials: submissions never retry at the
/// transport level, status fetches may, per `http_max_retries`.
pub struct FollowThroughClient {
    submit_client: AuthenticatedClient,
    poll_client: AuthenticatedClient,
    endpoint: Url,
}

impl FollowThroughClient {
    /// Create a new FollowThrough client from the process configuration.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let token = config.api_token().ok_or_else(|| {
            warn!("No FollowThrough API token configured");
            Error::internal(
                InternalErrorKind::Config,
                "FOLLOWTHROUGH_API_TOKEN is not set",
            )
        })?;
        let endpoint = Self::parse_endpoint(config.api_url())?;

        let client = |max_retries: u32| {
            AuthenticatedClientBuilder::new()
                .with_auth(Box::new(BearerTokenAuth::new(
                    ApiKeyProvider::FollowThrough,
                    SecretString::from(token.to_string()),
                )))
                .with_timeout(config.request_timeout())
                .with_max_retries(max_retries)
                .with_user_agent(format!("followthrough/{}", env!("CARGO_PKG_VERSION")))
                .build()
        };

        Ok(Self {
            submit_client: client(0)?,
            poll_client: client(config.http_max_retries)?,
            endpoint,
        })
    }

    fn parse_endpoint(api_url: &str) -> Result<Url, Error> {
        let endpoint = Url::parse(api_url).map_err(|e| {
            warn!("Invalid FollowThrough API URL {}: {:?}", api_url, e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;

        if endpoint.cannot_be_a_base() {
            return Err(Error::internal(
                InternalErrorKind::Config,
                format!("API URL {} cannot carry a job path", api_url),
            ));
        }
        Ok(endpoint)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `{endpoint}/{sessionId}`, with the identifier percent-encoded as one path segment.
    pub fn job_url(&self, job_id: &JobId) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(job_id.as_str());
        }
        url
    }
}

/// 5xx, 408 and 429 are worth another attempt; any other error status is final.
fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl Provider for FollowThroughClient {
    async fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        debug!("Submitting transcript to {}", self.endpoint);

        let response = self
            .submit_client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach FollowThrough: {:?}", e);
                SubmissionError::new(SubmissionErrorKind::Unreachable, e.to_string())
                    .with_source(e)
            })?;

        let status = response.status();
        if status.is_success() {
            response.json::<SubmissionReceipt>().await.map_err(|e| {
                warn!("Failed to parse FollowThrough submission response: {:?}", e);
                SubmissionError::new(SubmissionErrorKind::InvalidResponse, e.to_string())
                    .with_source(e)
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("FollowThrough API rejected submission ({}): {}", status, error_text);
            Err(SubmissionError::new(
                SubmissionErrorKind::Status(status.as_u16()),
                error_text,
            ))
        }
    }

    async fn fetch(&self, job_id: &JobId) -> Result<Value, FetchError> {
        let response = self
            .poll_client
            .get(self.job_url(job_id))
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get FollowThrough job {}: {:?}", job_id, e);
                FetchError::Transient(TransientFetchError::network(e.to_string()))
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                warn!("Failed to parse FollowThrough status response: {:?}", e);
                FetchError::Transient(TransientFetchError::server(
                    status.as_u16(),
                    format!("undecodable response body: {}", e),
                ))
            });
        }

        let error_text = response.text().await.unwrap_or_default();
        if is_transient(status) {
            Err(FetchError::Transient(TransientFetchError::server(
                status.as_u16(),
                error_text,
            )))
        } else {
            error!("FollowThrough API rejected status fetch ({}): {}", status, error_text);
            Err(FetchError::Rejected {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}
