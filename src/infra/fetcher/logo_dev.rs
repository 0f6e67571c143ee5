//! logo.dev image client.
//!
//! Fetches ticker logos from the logo.dev image API and reports every failure as a
//! classified [`DomainError`], so no HTTP detail reaches the application layer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument, warn};

use crate::domain::{
    AppError, ConfigError, DomainError, DomainErrorKind, LogoFetcher, TransportFailure, classify,
};

/// Default logo.dev image API base URL
pub const DEFAULT_LOGO_DEV_API_URL: &str = "https://img.logo.dev";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Logo service client backed by the logo.dev image API
#[derive(Debug, Clone)]
pub struct LogoDevClient {
    http_client: Client,
    token: SecretString,
    base_url: Url,
}

impl LogoDevClient {
    /// Create a new logo.dev client
    ///
    /// # Arguments
    /// * `token` - Publishable logo.dev API token, sent as the `token` query parameter
    /// * `base_url` - Optional custom API base URL. Defaults to logo.dev production.
    /// * `timeout` - Per-request timeout
    pub fn new(
        token: SecretString,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let raw_url = base_url.unwrap_or(DEFAULT_LOGO_DEV_API_URL);
        let base_url = Url::parse(raw_url).map_err(|e| ConfigError::Invalid {
            key: "LOGO_DEV_API_URL".to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                key: "LOGO_DEV_API_URL".to_string(),
                message: format!("{} cannot be used as a base URL", raw_url),
            }
            .into());
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            token,
            base_url,
        })
    }

    /// Create a client against the production API with the default timeout
    pub fn with_defaults(token: SecretString) -> Result<Self, AppError> {
        Self::new(token, None, DEFAULT_TIMEOUT)
    }

    /// `{base_url}/ticker/{identifier}`, with the identifier percent-encoded as one segment
    fn ticker_url(&self, identifier: &str) -> Result<Url, DomainError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                DomainError::with_detail(
                    DomainErrorKind::InvalidRequest,
                    "Logo service base URL cannot carry a path",
                )
            })?
            .pop_if_empty()
            .push("ticker")
            .push(identifier);
        Ok(url)
    }
}

#[async_trait]
impl LogoFetcher for LogoDevClient {
    #[instrument(skip(self))]
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, DomainError> {
        let url = self.ticker_url(identifier)?;
        debug!(url = %url, "Fetching logo from logo.dev");

        let response = self
            .http_client
            .get(url)
            .query(&[("token", self.token.expose_secret())])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "logo.dev request failed");
                classify(TransportFailure::connection(e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "logo.dev returned an error status");
            return Err(classify(TransportFailure::status(
                status.as_u16(),
                status.canonical_reason(),
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read logo.dev response body");
            classify(TransportFailure::connection(e.without_url()))
        })?;

        if body.is_empty() {
            warn!("logo.dev returned an empty body");
            return Err(DomainError::with_detail(
                DomainErrorKind::ExternalServiceError,
                "Logo service returned an empty image",
            ));
        }

        debug!(size = body.len(), "Logo fetched");
        Ok(body.to_vec())
    }
}
