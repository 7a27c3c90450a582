//! RSASSA-PKCS1-v1_5 verification.

use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::CryptoError;
use crate::types::DigestAlgorithm;
use crate::PublicKeyVerifier;

/// Smallest modulus accepted for import.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Largest modulus accepted for import.
pub const MAX_MODULUS_BITS: usize = 8192;

/// RSASSA-PKCS1-v1_5 verifier bound to one public key and digest.
#[derive(Debug, Clone)]
pub struct RsaVerifier {
    key: RsaPublicKey,
    digest: DigestAlgorithm,
}

impl RsaVerifier {
    /// Import a key from its big-endian modulus and exponent.
    pub fn from_components(
        modulus: &[u8],
        exponent: &[u8],
        digest: DigestAlgorithm,
    ) -> Result<Self, CryptoError> {
        let n = BigUint::from_bytes_be(modulus);
        let e = BigUint::from_bytes_be(exponent);

        let bits = n.bits();
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::invalid_public_key(format!(
                "modulus is {} bits, minimum is {}",
                bits, MIN_MODULUS_BITS
            )));
        }

        let key = RsaPublicKey::new_with_max_size(n, e, MAX_MODULUS_BITS)
            .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;

        Ok(Self { key, digest })
    }

    /// Wrap an already-parsed key.
    #[must_use]
    pub fn from_public_key(key: RsaPublicKey, digest: DigestAlgorithm) -> Self {
        Self { key, digest }
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn modulus_bits(&self) -> usize {
        self.key.n().bits()
    }
}

impl PublicKeyVerifier for RsaVerifier {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        if signature.len() != self.key.size() {
            return Err(CryptoError::invalid_signature(format!(
                "expected {} bytes, got {}",
                self.key.size(),
                signature.len()
            )));
        }

        let sig = Signature::try_from(signature)
            .map_err(|e| CryptoError::invalid_signature(e.to_string()))?;

        let result = match self.digest {
            DigestAlgorithm::Sha256 => {
                VerifyingKey::<Sha256>::new(self.key.clone()).verify(data, &sig)
            },
            DigestAlgorithm::Sha384 => {
                VerifyingKey::<Sha384>::new(self.key.clone()).verify(data, &sig)
            },
            DigestAlgorithm::Sha512 => {
                VerifyingKey::<Sha512>::new(self.key.clone()).verify(data, &sig)
            },
        };

        Ok(result.is_ok())
    }
}
