//! Turns a record's transport-encoded proof fields into verifiable material.
//!
//! Decoding fails closed: every base64, JSON or key-import problem becomes
//! [`Decoded::Indeterminate`]. Nothing here panics or returns early with an
//! error the caller has to handle.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

use crate::ecdsa::{P256Verifier, P384Verifier};
use crate::error::CryptoError;
use crate::jwk::KeyDescriptor;
use crate::rsa_pkcs1::RsaVerifier;
use crate::types::SignatureAlgorithm;
use crate::PublicKeyVerifier;

/// Standard base64 for record fields; padding tolerated.
const FIELD_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An imported public key, tagged with the scheme its descriptor named.
#[derive(Debug, Clone)]
pub enum VerificationKey {
    /// RSASSA-PKCS1-v1_5 key.
    Rsa {
        /// Algorithm from the descriptor.
        algorithm: SignatureAlgorithm,
        /// Bound verifier.
        verifier: RsaVerifier,
    },
    /// ECDSA P-256 key.
    P256(P256Verifier),
    /// ECDSA P-384 key.
    P384(P384Verifier),
}

impl VerificationKey {
    /// Import a key exactly as the descriptor specifies.
    pub fn from_descriptor(descriptor: &KeyDescriptor) -> Result<Self, CryptoError> {
        let algorithm = descriptor.algorithm()?;
        match algorithm {
            SignatureAlgorithm::Rs256 | SignatureAlgorithm::Rs384 | SignatureAlgorithm::Rs512 => {
                let verifier = RsaVerifier::from_components(
                    &descriptor.component("n")?,
                    &descriptor.component("e")?,
                    algorithm.digest(),
                )?;
                Ok(Self::Rsa {
                    algorithm,
                    verifier,
                })
            },
            SignatureAlgorithm::Es256 => Ok(Self::P256(P256Verifier::from_coordinates(
                &descriptor.component("x")?,
                &descriptor.component("y")?,
            )?)),
            SignatureAlgorithm::Es384 => Ok(Self::P384(P384Verifier::from_coordinates(
                &descriptor.component("x")?,
                &descriptor.component("y")?,
            )?)),
        }
    }

    /// Algorithm this key verifies under.
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Rsa { algorithm, .. } => *algorithm,
            Self::P256(_) => SignatureAlgorithm::Es256,
            Self::P384(_) => SignatureAlgorithm::Es384,
        }
    }
}

impl PublicKeyVerifier for VerificationKey {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        match self {
            Self::Rsa { verifier, .. } => verifier.verify(data, signature),
            Self::P256(verifier) => verifier.verify(data, signature),
            Self::P384(verifier) => verifier.verify(data, signature),
        }
    }
}

/// Decoded proof material for a single record.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// Imported verification key.
    pub key: VerificationKey,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
    /// Raw email-hash bytes (the signed message).
    pub hash: Vec<u8>,
}

impl KeyMaterial {
    /// Check the signature over the hash bytes.
    ///
    /// `Err` means the check could not run to completion (for example a
    /// signature of the wrong length for the key).
    pub fn verify(&self) -> Result<bool, CryptoError> {
        self.key.verify(&self.hash, &self.signature)
    }
}

/// Result of [`KeyMaterialDecoder::decode`].
#[derive(Debug)]
pub enum Decoded {
    /// All three fields decoded and the key imported.
    Material(KeyMaterial),
    /// Some field could not be decoded; the record offers no usable proof.
    Indeterminate(CryptoError),
}

impl Decoded {
    /// Whether decoding produced usable material.
    #[must_use]
    pub fn is_material(&self) -> bool {
        matches!(self, Self::Material(_))
    }
}

impl From<Result<KeyMaterial, CryptoError>> for Decoded {
    fn from(result: Result<KeyMaterial, CryptoError>) -> Self {
        match result {
            Ok(material) => Self::Material(material),
            Err(e) => Self::Indeterminate(e),
        }
    }
}

/// Decoder for `(publicKey, signature, emailHash)` transport fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMaterialDecoder;

impl KeyMaterialDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decode all three fields and import the key.
    pub fn decode(&self, public_key_b64: &str, signature_b64: &str, email_hash_b64: &str) -> Decoded {
        let decoded: Decoded = Self::try_decode(public_key_b64, signature_b64, email_hash_b64).into();
        if let Decoded::Indeterminate(e) = &decoded {
            debug!(error = %e, "Key material not decodable");
        }
        decoded
    }

    fn try_decode(
        public_key_b64: &str,
        signature_b64: &str,
        email_hash_b64: &str,
    ) -> Result<KeyMaterial, CryptoError> {
        let signature = decode_field("signature", signature_b64)?;
        let hash = decode_field("emailHash", email_hash_b64)?;
        let descriptor_json = decode_field("publicKey", public_key_b64)?;

        let descriptor = KeyDescriptor::from_json(&descriptor_json)?;
        let key = VerificationKey::from_descriptor(&descriptor)?;

        Ok(KeyMaterial {
            key,
            signature,
            hash,
        })
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = FIELD_B64
        .decode(value.trim())
        .map_err(|e| CryptoError::invalid_encoding(field, e.to_string()))?;
    if bytes.is_empty() {
        return Err(CryptoError::invalid_encoding(field, "empty value"));
    }
    Ok(bytes)
}

/// Encode bytes the way records carry them (standard, padded base64).
#[must_use]
pub fn encode_field(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
