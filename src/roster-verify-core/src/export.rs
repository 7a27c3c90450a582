//! CSV rendering of a verified batch.
//!
//! Columns: `ID,Email,Role,Status,CreatedAt,SignatureValid`.
//! `SignatureValid` is `Yes` only for records whose outcome is `Valid`;
//! `Invalid` and `Indeterminate` are `No`. Each row uses its own record's
//! outcome, never one looked up by id.
//! Output is a pure function of its inputs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::error::VerifyError;
use crate::report::VerificationReport;
use crate::types::{UserRecord, VerificationOutcome};

/// Header row.
pub const CSV_HEADER: [&str; 6] = ["ID", "Email", "Role", "Status", "CreatedAt", "SignatureValid"];

/// Renders records and outcomes as CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportFormatter;

impl ExportFormatter {
    /// Render `records` in order; `outcomes[i]` belongs to `records[i]`.
    ///
    /// Fields containing `,`, `"` or line breaks are quoted, quotes doubled.
    pub fn to_csv(
        records: &[UserRecord],
        outcomes: &[VerificationOutcome],
    ) -> Result<Vec<u8>, VerifyError> {
        if records.len() != outcomes.len() {
            return Err(VerifyError::ExportError {
                message: format!(
                    "{} records but {} outcomes",
                    records.len(),
                    outcomes.len()
                ),
            });
        }

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADER)?;

        for (record, outcome) in records.iter().zip(outcomes) {
            let created_at = record
                .created_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default();
            let signature_valid = match outcome {
                VerificationOutcome::Valid => "Yes",
                VerificationOutcome::Invalid | VerificationOutcome::Indeterminate => "No",
            };

            writer.write_record([
                record.id.as_str(),
                record.email.as_str(),
                record.role.as_str(),
                record.status.as_str(),
                created_at.as_str(),
                signature_valid,
            ])?;
        }

        writer.into_inner().map_err(|e| VerifyError::ExportError {
            message: e.to_string(),
        })
    }

    /// Render a report.
    pub fn report_to_csv(report: &VerificationReport) -> Result<Vec<u8>, VerifyError> {
        Self::to_csv(report.records(), report.outcomes())
    }
}

/// `users_export_<unix-millis>.csv`
#[must_use]
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("users_export_{}.csv", at.timestamp_millis())
}

/// Write the report's CSV into `dir` and return the file path.
pub fn write_export(
    dir: &Path,
    report: &VerificationReport,
    at: DateTime<Utc>,
) -> Result<PathBuf, VerifyError> {
    let bytes = ExportFormatter::report_to_csv(report)?;
    let path = dir.join(export_file_name(at));
    std::fs::write(&path, &bytes)?;
    info!(path = %path.display(), rows = report.records().len(), "Export written");
    Ok(path)
}
