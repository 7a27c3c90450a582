//! HTTP client for the user directory service.
//!
//! ## Endpoints
//!
//! - `GET <base>/export` (`Accept: application/x-protobuf`) - opaque binary batch
//! - `GET <base>/getUsers` - `{ "users": [...] }` or `[...]`
//!
//! Every transport problem (connect failure, timeout, non-2xx) is reported
//! as [`VerifyError::ChannelError`] for the channel involved; deciding what
//! to do about it is left to the fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, info, instrument, warn};

use crate::config::DirectoryConfig;
use crate::error::VerifyError;
use crate::fetch::DirectoryChannel;
use crate::types::Channel;

/// `Accept` value for the binary channel.
pub const BINARY_CONTENT_TYPE: &str = "application/x-protobuf";

/// HTTP client for the directory endpoints.
pub struct DirectoryClient {
    client: Client,
    /// Base URL for the API, no trailing slash.
    base_url: String,
}

impl DirectoryClient {
    /// Create a client from configuration.
    pub fn new(config: &DirectoryConfig) -> Result<Self, VerifyError> {
        config.validate()?;

        // Fail fast on unreachable hosts; the overall timeout still applies.
        let connect_timeout = config.timeout.min(Duration::from_secs(3));

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| VerifyError::ConfigError {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    /// Endpoint root in use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get(&self, channel: Channel, url: &str, accept: &str) -> Result<Vec<u8>, VerifyError> {
        debug!(url = %url, channel = %channel, "HTTP GET");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                VerifyError::channel(channel, format!("Request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "HTTP: Non-success status");
            return Err(VerifyError::channel(
                channel,
                format!("HTTP {} from {}", status, url),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            VerifyError::channel(channel, format!("Failed to read body from {}: {}", url, e))
        })?;

        info!(url = %url, channel = %channel, bytes = body.len(), "HTTP: Response received");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DirectoryChannel for DirectoryClient {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn fetch_binary(&self) -> Result<Vec<u8>, VerifyError> {
        self.get(Channel::Binary, &self.url("export"), BINARY_CONTENT_TYPE)
            .await
    }

    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn fetch_structured(&self) -> Result<Vec<u8>, VerifyError> {
        self.get(Channel::Structured, &self.url("getUsers"), "application/json")
            .await
    }
}
