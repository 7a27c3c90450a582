//! # roster-verify-core
//!
//! Fetch, verify and export user records whose email identity is bound to
//! them by an embedded signature.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  RecordBatchFetcher                          │
//! │   binary channel (/export)  ──fail──▶  fallback              │
//! │   structured channel (/getUsers) ──▶ records                 │
//! └─────────────────────────────────────────────────────────────┘
//!                            │ Batch { records, provenance, bytes }
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  VerificationReport                          │
//! │   per record, concurrently:                                  │
//! │   KeyMaterialDecoder ──▶ SignatureVerifier ──▶ outcome       │
//! └─────────────────────────────────────────────────────────────┘
//!                            │ records + outcomes + counts
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ExportFormatter (CSV)                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Three-way outcome**: missing proof (`Indeterminate`) is never
//!   conflated with failed proof (`Invalid`)
//! - **Nothing dropped**: every fetched record appears in the report and export
//! - **Visible provenance**: a fallback batch always says so
//! - **Derived export**: `SignatureValid` comes from local verification only

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)] // Too strict for production code
#![allow(clippy::missing_errors_doc)] // Error documentation not required
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod https;
pub mod report;
pub mod types;
pub mod verifier;

pub use config::{DirectoryConfig, DEFAULT_BASE_URL};
pub use error::VerifyError;
pub use export::{export_file_name, write_export, ExportFormatter, CSV_HEADER};
pub use fetch::{DirectoryChannel, PayloadShape, RecordBatchFetcher, StructuredPayload};
pub use https::DirectoryClient;
pub use report::VerificationReport;
pub use types::{
    Batch, Channel, ExportInfo, OutcomeCounts, Provenance, Role, UserRecord, UserStatus,
    VerificationOutcome,
};
pub use verifier::SignatureVerifier;

/// Fetch a batch and verify it.
///
/// The one-call form of the pipeline; fails only when no channel produced
/// records.
pub async fn fetch_and_verify(config: &DirectoryConfig) -> Result<VerificationReport, VerifyError> {
    let fetcher = RecordBatchFetcher::from_config(config)?;
    let batch = fetcher.fetch().await?;
    Ok(VerificationReport::build(&batch).await)
}
