//! Per-record signature verification.
//!
//! The outcome is a pure function of the record's own fields:
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | `signature`, `emailHash` or `publicKey` absent | `Indeterminate` (no decode attempted) |
//! | a field does not decode, or the key does not import | `Indeterminate` |
//! | check ran and passed | `Valid` |
//! | check ran and failed, or errored while running | `Invalid` |

use roster_crypto::{Decoded, KeyMaterialDecoder};
use tracing::debug;

use crate::types::{UserRecord, VerificationOutcome};

/// Classifies records by their embedded signature.
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier {
    decoder: KeyMaterialDecoder,
}

impl SignatureVerifier {
    /// Create a verifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: KeyMaterialDecoder::new(),
        }
    }

    /// Verify one record against its own key.
    pub fn verify(&self, record: &UserRecord) -> VerificationOutcome {
        let Some((public_key, signature, email_hash)) = record.proof() else {
            debug!(id = %record.id, "No proof offered");
            return VerificationOutcome::Indeterminate;
        };

        let material = match self.decoder.decode(public_key, signature, email_hash) {
            Decoded::Material(material) => material,
            Decoded::Indeterminate(e) => {
                debug!(id = %record.id, error = %e, "Proof not decodable");
                return VerificationOutcome::Indeterminate;
            },
        };

        match material.verify() {
            Ok(true) => VerificationOutcome::Valid,
            Ok(false) => {
                debug!(id = %record.id, alg = %material.key.algorithm(), "Signature mismatch");
                VerificationOutcome::Invalid
            },
            Err(e) => {
                debug!(id = %record.id, error = %e, "Signature check errored");
                VerificationOutcome::Invalid
            },
        }
    }
}
