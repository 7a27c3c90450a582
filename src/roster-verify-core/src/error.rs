//! Error types for fetch and export operations.
//!
//! Per-record verification problems are not errors: they surface only as
//! [`VerificationOutcome`](crate::types::VerificationOutcome) values.

use thiserror::Error;

use crate::types::Channel;

/// Errors that can occur while fetching or exporting.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// One channel was unreachable or answered non-2xx.
    #[error("{channel} channel error: {message}")]
    ChannelError {
        /// Which channel failed.
        channel: Channel,
        /// Error message.
        message: String,
    },

    /// No channel produced records.
    #[error("Failed to fetch users: {structured} (binary channel: {binary})")]
    NoChannelsReachable {
        /// What happened on the binary channel.
        binary: String,
        /// What happened on the structured channel.
        structured: String,
    },

    /// Structured channel answered with a payload of no recognised shape.
    #[error("Malformed directory payload: {reason}")]
    MalformedPayload {
        /// Reason the payload was rejected.
        reason: String,
    },

    /// Writing the CSV artifact failed.
    #[error("Export error: {message}")]
    ExportError {
        /// Error message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message.
        message: String,
    },
}

impl VerifyError {
    /// Create a channel error.
    #[must_use]
    pub fn channel(channel: Channel, message: impl Into<String>) -> Self {
        Self::ChannelError {
            channel,
            message: message.into(),
        }
    }

    /// Whether a fallback path may recover from this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ChannelError {
                channel: Channel::Binary,
                ..
            }
        )
    }
}

impl From<csv::Error> for VerifyError {
    fn from(e: csv::Error) -> Self {
        Self::ExportError {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for VerifyError {
    fn from(e: std::io::Error) -> Self {
        Self::ExportError {
            message: e.to_string(),
        }
    }
}
