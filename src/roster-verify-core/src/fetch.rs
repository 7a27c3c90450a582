//! Dual-channel batch acquisition.
//!
//! The binary channel is tried first and only contributes transport
//! metadata (its payload has no record decoder). The structured channel is
//! always queried and is the sole source of records.
//!
//! ```text
//! binary ok   + structured ok   -> Batch { provenance: Binary,   byte_size: binary body }
//! binary fail + structured ok   -> Batch { provenance: Fallback, byte_size: JSON array }
//! any         + structured fail -> VerifyError::NoChannelsReachable
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::DirectoryConfig;
use crate::error::VerifyError;
use crate::https::DirectoryClient;
use crate::types::{Batch, Provenance, UserRecord};

/// Transport for the two directory channels.
#[async_trait]
pub trait DirectoryChannel: Send + Sync {
    /// Raw body of the binary export endpoint.
    async fn fetch_binary(&self) -> Result<Vec<u8>, VerifyError>;

    /// Raw JSON body of the user listing endpoint.
    async fn fetch_structured(&self) -> Result<Vec<u8>, VerifyError>;
}

/// Recognised shapes of the structured payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{ "users": [...] }`
    Wrapped,
    /// `[...]`
    Bare,
    /// `null`, or `{ "users": null }`
    Empty,
}

/// Structured payload normalised to one representation.
#[derive(Debug, Clone)]
pub struct StructuredPayload {
    /// Shape the payload arrived in.
    pub shape: PayloadShape,
    /// Parsed records, in payload order.
    pub records: Vec<UserRecord>,
    /// Array entries dropped because they carried no usable `id`.
    pub skipped: usize,
    /// Length of the compact JSON serialisation of the record array.
    pub serialized_len: u64,
}

impl PayloadShape {
    /// Parse and normalise a structured payload.
    pub fn decode(body: &[u8]) -> Result<StructuredPayload, VerifyError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| VerifyError::MalformedPayload {
            reason: format!("not JSON: {}", e),
        })?;

        let (shape, array) = match value {
            Value::Array(items) => (Self::Bare, items),
            Value::Object(mut map) => match map.remove("users") {
                Some(Value::Array(items)) => (Self::Wrapped, items),
                Some(Value::Null) => (Self::Empty, Vec::new()),
                Some(other) => {
                    return Err(VerifyError::MalformedPayload {
                        reason: format!("\"users\" is {}, expected an array", json_kind(&other)),
                    })
                },
                None => {
                    return Err(VerifyError::MalformedPayload {
                        reason: "object without a \"users\" array".into(),
                    })
                },
            },
            Value::Null => (Self::Empty, Vec::new()),
            other => {
                return Err(VerifyError::MalformedPayload {
                    reason: format!("top-level {}, expected an array or object", json_kind(&other)),
                })
            },
        };

        let serialized_len = serde_json::to_vec(&array)
            .map(|bytes| bytes.len() as u64)
            .map_err(|e| VerifyError::MalformedPayload {
                reason: e.to_string(),
            })?;

        let mut records = Vec::with_capacity(array.len());
        let mut skipped = 0;
        for (index, item) in array.into_iter().enumerate() {
            match serde_json::from_value::<UserRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping user record without a usable id");
                    skipped += 1;
                },
            }
        }

        Ok(StructuredPayload {
            shape,
            records,
            skipped,
            serialized_len,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches one [`Batch`] per call, binary channel first.
pub struct RecordBatchFetcher {
    channel: Arc<dyn DirectoryChannel>,
    binary_enabled: bool,
}

impl RecordBatchFetcher {
    /// Fetcher over the HTTP directory client.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, VerifyError> {
        let client = DirectoryClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_binary(config.binary_enabled))
    }

    /// Fetcher over any channel implementation.
    #[must_use]
    pub fn new(channel: Arc<dyn DirectoryChannel>) -> Self {
        Self {
            channel,
            binary_enabled: true,
        }
    }

    /// Enable or disable the binary attempt.
    #[must_use]
    pub fn with_binary(mut self, enabled: bool) -> Self {
        self.binary_enabled = enabled;
        self
    }

    /// Fetch a batch.
    ///
    /// Fails only if the structured channel produced no records.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Batch, VerifyError> {
        let binary = if self.binary_enabled {
            match self.channel.fetch_binary().await {
                Ok(body) => {
                    info!(bytes = body.len(), "Binary payload received");
                    Ok(body.len() as u64)
                },
                Err(e) => {
                    warn!(error = %e, "Binary channel not available, using fallback");
                    Err(e.to_string())
                },
            }
        } else {
            debug!("Binary channel disabled");
            Err("disabled".to_string())
        };
        let binary_at = Utc::now();

        let payload = match self.channel.fetch_structured().await {
            Ok(body) => PayloadShape::decode(&body),
            Err(e) => Err(e),
        };

        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                let binary = match binary {
                    Ok(bytes) => format!("returned {} bytes, not decodable into records", bytes),
                    Err(reason) => reason,
                };
                warn!(error = %e, "Structured channel failed; no records available");
                return Err(VerifyError::NoChannelsReachable {
                    binary,
                    structured: e.to_string(),
                });
            },
        };

        debug!(
            shape = ?payload.shape,
            records = payload.records.len(),
            skipped = payload.skipped,
            "Structured payload decoded"
        );

        let batch = match binary {
            Ok(bytes) => Batch::new(payload.records, Provenance::Binary, bytes, binary_at),
            Err(_) => Batch::new(
                payload.records,
                Provenance::Fallback,
                payload.serialized_len,
                Utc::now(),
            ),
        };

        info!(
            provenance = %batch.provenance(),
            records = batch.len(),
            bytes = batch.byte_size(),
            "Batch fetched"
        );
        Ok(batch)
    }
}
