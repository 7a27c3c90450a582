//! Record, batch and outcome types shared across the pipeline.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user.
    #[default]
    User,
    /// Administrator.
    Admin,
    /// Any value the directory sends that is not recognised.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Lowercase name as the directory spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Active account.
    #[default]
    Active,
    /// Deactivated account.
    Inactive,
    /// Any value the directory sends that is not recognised.
    #[serde(other)]
    Unknown,
}

impl UserStatus {
    /// Lowercase name as the directory spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }
}

/// A user as returned by the directory service.
///
/// Read-only to this crate. Verification outcomes are never stored here.
/// Every field except `id` tolerates `null` and mistyped values: they fall
/// back to the default (or `None` for the proof fields) so that one odd
/// record is classified rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque identifier (numeric ids are kept as their decimal text).
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,

    /// Claimed email identity.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,

    /// Role.
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Role,

    /// Status.
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: UserStatus,

    /// Creation time (RFC 3339 text or epoch milliseconds on the wire).
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// base64 digest bound to `email`.
    #[serde(
        default,
        deserialize_with = "deserialize_proof_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_hash: Option<String>,

    /// base64 signature over the `email_hash` bytes.
    #[serde(
        default,
        deserialize_with = "deserialize_proof_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<String>,

    /// base64 JSON key descriptor of the signer.
    #[serde(
        default,
        deserialize_with = "deserialize_proof_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key: Option<String>,
}

impl UserRecord {
    /// The three proof fields, if all are present and non-empty.
    ///
    /// Returned as `(public_key, signature, email_hash)`.
    #[must_use]
    pub fn proof(&self) -> Option<(&str, &str, &str)> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|v| !v.trim().is_empty())
        }
        Some((
            present(&self.public_key)?,
            present(&self.signature)?,
            present(&self.email_hash)?,
        ))
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn deserialize_proof_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// `null` takes the default; anything unrecognised takes `mistyped`.
fn lenient_enum<T>(value: Value, mistyped: T) -> T
where
    T: DeserializeOwned + Default,
{
    match value {
        Value::Null => T::default(),
        other => serde_json::from_value(other).unwrap_or(mistyped),
    }
}

fn deserialize_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_enum(Value::deserialize(deserializer)?, Role::Unknown))
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<UserStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_enum(Value::deserialize(deserializer)?, UserStatus::Unknown))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

/// Three-way result of checking one record's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    /// Signature checked and passed.
    Valid,
    /// Proof was presented but did not verify.
    Invalid,
    /// No usable proof: a field is missing or undecodable.
    Indeterminate,
}

impl VerificationOutcome {
    /// Label used in listings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Indeterminate => "Unknown",
        }
    }
}

/// Aggregate outcome counts for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Records that verified.
    pub valid: usize,
    /// Records whose proof failed.
    pub invalid: usize,
    /// Records without usable proof.
    pub indeterminate: usize,
}

impl OutcomeCounts {
    /// Count one outcome.
    pub fn record(&mut self, outcome: VerificationOutcome) {
        match outcome {
            VerificationOutcome::Valid => self.valid += 1,
            VerificationOutcome::Invalid => self.invalid += 1,
            VerificationOutcome::Indeterminate => self.indeterminate += 1,
        }
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.indeterminate
    }
}

/// A transport channel of the directory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// `GET /export` with `Accept: application/x-protobuf`.
    Binary,
    /// `GET /getUsers` JSON.
    Structured,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Structured => f.write_str("structured"),
        }
    }
}

/// Which channel a batch's size metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Binary channel answered.
    Binary,
    /// Binary channel unavailable; only the structured channel was used.
    Fallback,
}

impl Provenance {
    /// Whether this batch came from the fallback path.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// One fetch result. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    records: Vec<UserRecord>,
    provenance: Provenance,
    byte_size: u64,
    fetched_at: DateTime<Utc>,
}

impl Batch {
    /// Assemble a batch.
    #[must_use]
    pub fn new(
        records: Vec<UserRecord>,
        provenance: Provenance,
        byte_size: u64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            records,
            provenance,
            byte_size,
            fetched_at,
        }
    }

    /// Records in directory order.
    #[must_use]
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// Channel provenance.
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Payload size in bytes (binary body, or serialised JSON array on fallback).
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// When the batch was fetched.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Transport summary for display.
    #[must_use]
    pub fn export_info(&self) -> ExportInfo {
        ExportInfo {
            bytes: self.byte_size,
            timestamp: self.fetched_at,
            fallback: self.provenance.is_fallback(),
        }
    }
}

/// Transport metadata shown alongside a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Payload size in bytes.
    pub bytes: u64,
    /// Fetch time.
    pub timestamp: DateTime<Utc>,
    /// Whether the fallback channel supplied the batch.
    pub fallback: bool,
}

impl fmt::Display for ExportInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fallback {
            write!(
                f,
                "Using fallback endpoint (binary channel not available): {} bytes",
                self.bytes
            )
        } else {
            write!(f, "Binary payload received: {} bytes", self.bytes)
        }
    }
}
