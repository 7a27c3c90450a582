//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur while importing key material or verifying.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A transport field was not valid base64.
    #[error("Invalid base64 in {field}: {reason}")]
    InvalidEncoding {
        /// Which field failed to decode.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// The key descriptor is not a well-formed JSON Web Key.
    #[error("Invalid key descriptor: {reason}")]
    InvalidKeyDescriptor {
        /// Reason the descriptor was rejected.
        reason: String,
    },

    /// Algorithm not supported.
    #[error("Algorithm not supported: {algorithm}")]
    UnsupportedAlgorithm {
        /// The unsupported algorithm.
        algorithm: String,
    },

    /// The descriptor restricts the key to uses other than verification.
    #[error("Key not usable for verification: {reason}")]
    KeyUsageMismatch {
        /// Reason for the mismatch.
        reason: String,
    },

    /// Invalid public key parameters.
    #[error("Invalid public key: {reason}")]
    InvalidPublicKey {
        /// Reason the key is invalid.
        reason: String,
    },

    /// Invalid signature format or length.
    #[error("Invalid signature: {reason}")]
    InvalidSignature {
        /// Reason the signature is invalid.
        reason: String,
    },
}

impl CryptoError {
    /// Create an invalid encoding error.
    #[must_use]
    pub fn invalid_encoding(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            field,
            reason: reason.into(),
        }
    }

    /// Create an invalid key descriptor error.
    #[must_use]
    pub fn invalid_descriptor(reason: impl Into<String>) -> Self {
        Self::InvalidKeyDescriptor {
            reason: reason.into(),
        }
    }

    /// Create an invalid public key error.
    #[must_use]
    pub fn invalid_public_key(reason: impl Into<String>) -> Self {
        Self::InvalidPublicKey {
            reason: reason.into(),
        }
    }

    /// Create an invalid signature error.
    #[must_use]
    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }
}
