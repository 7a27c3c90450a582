//! Verification of a whole batch.
//!
//! Every record is checked on its own blocking task; the tasks share only
//! an immutable [`SignatureVerifier`]. Counts are computed after all tasks
//! have been joined. No record is dropped, whatever its outcome.
//!
//! Outcomes are kept per record, in batch order, so records that share an
//! id never borrow each other's result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::types::{Batch, OutcomeCounts, Provenance, UserRecord, VerificationOutcome};
use crate::verifier::SignatureVerifier;

/// Records of one batch with their outcomes.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    batch: Batch,
    outcomes: Vec<VerificationOutcome>,
    counts: OutcomeCounts,
}

impl VerificationReport {
    /// Verify every record of `batch` with a default verifier.
    pub async fn build(batch: &Batch) -> Self {
        Self::build_with(batch, Arc::new(SignatureVerifier::new())).await
    }

    /// Verify every record of `batch` concurrently.
    ///
    /// A task that panics or is cancelled yields `Indeterminate` for its
    /// record; it never aborts the batch.
    #[instrument(skip_all, fields(records = batch.len(), provenance = %batch.provenance()))]
    pub async fn build_with(batch: &Batch, verifier: Arc<SignatureVerifier>) -> Self {
        let tasks: Vec<_> = batch
            .records()
            .iter()
            .map(|record| {
                let record = record.clone();
                let verifier = Arc::clone(&verifier);
                tokio::task::spawn_blocking(move || verifier.verify(&record))
            })
            .collect();

        let results = futures::future::join_all(tasks).await;

        let per_record: Vec<VerificationOutcome> = results
            .into_iter()
            .zip(batch.records())
            .map(|(result, record)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(id = %record.id, error = %e, "Verification task failed");
                    VerificationOutcome::Indeterminate
                },
            })
            .collect();

        let report = Self::from_outcomes(batch.clone(), per_record);
        info!(
            valid = report.counts.valid,
            invalid = report.counts.invalid,
            indeterminate = report.counts.indeterminate,
            "Verification complete"
        );
        report
    }

    /// Verify sequentially on the current thread.
    #[must_use]
    pub fn build_blocking(batch: &Batch, verifier: &SignatureVerifier) -> Self {
        let per_record: Vec<VerificationOutcome> =
            batch.records().iter().map(|r| verifier.verify(r)).collect();
        Self::from_outcomes(batch.clone(), per_record)
    }

    fn from_outcomes(batch: Batch, outcomes: Vec<VerificationOutcome>) -> Self {
        debug_assert_eq!(outcomes.len(), batch.len());
        let mut counts = OutcomeCounts::default();
        for outcome in &outcomes {
            counts.record(*outcome);
        }

        Self {
            batch,
            outcomes,
            counts,
        }
    }

    /// All records, in batch order.
    #[must_use]
    pub fn records(&self) -> &[UserRecord] {
        self.batch.records()
    }

    /// Outcome per record, aligned with [`records`](Self::records).
    #[must_use]
    pub fn outcomes(&self) -> &[VerificationOutcome] {
        &self.outcomes
    }

    /// Each record paired with its own outcome, in batch order.
    pub fn entries(&self) -> impl Iterator<Item = (&UserRecord, VerificationOutcome)> + '_ {
        self.batch.records().iter().zip(self.outcomes.iter().copied())
    }

    /// Aggregate counts; always sums to the record count.
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    /// Outcome for one id.
    ///
    /// When several records share `id` and disagree, the result is never
    /// `Valid`: `Invalid` if any of them is invalid, `Indeterminate` otherwise.
    #[must_use]
    pub fn outcome_for(&self, id: &str) -> Option<VerificationOutcome> {
        self.entries()
            .filter(|(record, _)| record.id == id)
            .map(|(_, outcome)| outcome)
            .reduce(|a, b| match (a, b) {
                _ if a == b => a,
                (VerificationOutcome::Invalid, _) | (_, VerificationOutcome::Invalid) => {
                    VerificationOutcome::Invalid
                },
                _ => VerificationOutcome::Indeterminate,
            })
    }

    /// The verified batch.
    #[must_use]
    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// Provenance of the underlying batch.
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.batch.provenance()
    }

    /// Payload size of the underlying batch.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.batch.byte_size()
    }

    /// Fetch time of the underlying batch.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.batch.fetched_at()
    }
}
