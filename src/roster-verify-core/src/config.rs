//! Configuration for the directory client and fetcher.

use std::time::Duration;

use crate::error::VerifyError;

/// Default endpoint root of the user directory service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api_v1/user";

/// Configuration for reaching the user directory.
///
/// Passed explicitly to every component that needs it; there is no
/// process-wide base URL.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Endpoint root; `/export` and `/getUsers` are appended.
    pub base_url: String,
    /// Total request timeout per channel.
    pub timeout: Duration,
    /// Whether to attempt the binary channel at all.
    pub binary_enabled: bool,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(30),
            binary_enabled: true,
            user_agent: format!("roster-verify/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DirectoryConfig {
    /// Configuration for the given endpoint root.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the per-channel timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the binary channel.
    #[must_use]
    pub fn with_binary(mut self, enabled: bool) -> Self {
        self.binary_enabled = enabled;
        self
    }

    /// Endpoint root without trailing slashes.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the configuration before building a client.
    pub fn validate(&self) -> Result<(), VerifyError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VerifyError::ConfigError {
                message: format!("base URL must be http(s), got {:?}", self.base_url),
            });
        }
        if self.timeout.is_zero() {
            return Err(VerifyError::ConfigError {
                message: "timeout must be non-zero".into(),
            });
        }
        Ok(())
    }
}
