//! ECDSA P-256 / P-384 signature verification.
//!
//! Signatures are the fixed-width `r || s` encoding WebCrypto produces,
//! not DER.

use p256::ecdsa::signature::Verifier;

use crate::error::CryptoError;
use crate::PublicKeyVerifier;

/// Build an uncompressed SEC1 point from JWK coordinates.
fn sec1_point(x: &[u8], y: &[u8], coordinate_len: usize) -> Result<Vec<u8>, CryptoError> {
    if x.len() != coordinate_len || y.len() != coordinate_len {
        return Err(CryptoError::invalid_public_key(format!(
            "coordinates must be {} bytes, got x={} y={}",
            coordinate_len,
            x.len(),
            y.len()
        )));
    }
    let mut point = Vec::with_capacity(1 + 2 * coordinate_len);
    point.push(0x04);
    point.extend_from_slice(x);
    point.extend_from_slice(y);
    Ok(point)
}

/// ECDSA P-256 verifier.
#[derive(Debug, Clone)]
pub struct P256Verifier {
    key: p256::ecdsa::VerifyingKey,
}

impl P256Verifier {
    /// Import from JWK `x` / `y` coordinates.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        Self::from_sec1_bytes(&sec1_point(x, y, 32)?)
    }

    /// Import from a SEC1-encoded point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;
        Ok(Self { key })
    }
}

impl PublicKeyVerifier for P256Verifier {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let sig = p256::ecdsa::Signature::from_slice(signature)
            .map_err(|e| CryptoError::invalid_signature(e.to_string()))?;

        match self.key.verify(data, &sig) {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}

/// ECDSA P-384 verifier.
#[derive(Debug, Clone)]
pub struct P384Verifier {
    key: p384::ecdsa::VerifyingKey,
}

impl P384Verifier {
    /// Import from JWK `x` / `y` coordinates.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<Self, CryptoError> {
        Self::from_sec1_bytes(&sec1_point(x, y, 48)?)
    }

    /// Import from a SEC1-encoded point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| CryptoError::invalid_public_key(e.to_string()))?;
        Ok(Self { key })
    }
}

impl PublicKeyVerifier for P384Verifier {
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let sig = p384::ecdsa::Signature::from_slice(signature)
            .map_err(|e| CryptoError::invalid_signature(e.to_string()))?;

        match self.key.verify(data, &sig) {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
