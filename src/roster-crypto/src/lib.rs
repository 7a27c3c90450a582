//! # roster-crypto
//!
//! Key import and signature verification for roster-verify.
//!
//! Each user record carries its own proof:
//!
//! ```text
//! emailHash  = base64(digest bound to the email, produced upstream)
//! signature  = base64(Sign(private_key, emailHash bytes))
//! publicKey  = base64(json(JWK))
//! ```
//!
//! The JWK names its own algorithm (`alg`), which fixes both the signature
//! primitive and the digest:
//!
//! | `alg` | Primitive | Digest |
//! |-------|-----------|--------|
//! | RS256 / RS384 / RS512 | RSASSA-PKCS1-v1_5 | SHA-256 / 384 / 512 |
//! | ES256 | ECDSA P-256 (`r \|\| s`) | SHA-256 |
//! | ES384 | ECDSA P-384 (`r \|\| s`) | SHA-384 |
//!
//! [`KeyMaterialDecoder`] never fails loudly: undecodable input is reported
//! as [`Decoded::Indeterminate`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decoder;
mod ecdsa;
mod error;
mod jwk;
mod rsa_pkcs1;
mod types;

pub use decoder::{encode_field, Decoded, KeyMaterial, KeyMaterialDecoder, VerificationKey};
pub use ecdsa::{P256Verifier, P384Verifier};
pub use error::CryptoError;
pub use jwk::KeyDescriptor;
pub use rsa_pkcs1::{RsaVerifier, MAX_MODULUS_BITS, MIN_MODULUS_BITS};
pub use types::{DigestAlgorithm, KeyType, SignatureAlgorithm};

/// Verification against a single bound public key.
pub trait PublicKeyVerifier {
    /// Verify `signature` over `data`.
    ///
    /// `Ok(false)` is a completed check that did not pass; `Err` means the
    /// signature could not be parsed for this key.
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError>;
}
