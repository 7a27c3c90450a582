//! JSON Web Key descriptors (RFC 7517) for public verification keys.
//!
//! Records carry their signer's key as `base64(json(jwk))`. Only the
//! public members are read; private members, if present, are ignored.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::types::{KeyType, SignatureAlgorithm};

/// base64url as used inside JWK members; padding tolerated.
const JWK_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Public key descriptor in JWK form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Key type (`RSA` or `EC`).
    pub kty: String,
    /// Signature algorithm (`RS384`, `ES256`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Curve for EC keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// RSA modulus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// EC x coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// EC y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Permitted operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    /// Intended use (`sig` / `enc`).
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Extractable flag written by WebCrypto exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}

impl KeyDescriptor {
    /// Parse a descriptor from its JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CryptoError> {
        serde_json::from_slice(bytes).map_err(|e| CryptoError::invalid_descriptor(e.to_string()))
    }

    /// Resolve the signature algorithm named by the descriptor.
    ///
    /// `alg` is mandatory and must agree with `kty` (and `crv` for EC keys).
    /// Descriptors restricted to non-verification use are rejected.
    pub fn algorithm(&self) -> Result<SignatureAlgorithm, CryptoError> {
        let name = self
            .alg
            .as_deref()
            .ok_or_else(|| CryptoError::invalid_descriptor("missing \"alg\" member"))?;
        let alg = SignatureAlgorithm::from_jwk_alg(name).ok_or_else(|| {
            CryptoError::UnsupportedAlgorithm {
                algorithm: name.to_string(),
            }
        })?;

        let expected_kty = alg.key_type().jwk_name();
        if self.kty != expected_kty {
            return Err(CryptoError::invalid_descriptor(format!(
                "kty {:?} does not match {} (expected {:?})",
                self.kty, alg, expected_kty
            )));
        }

        if alg.key_type() == KeyType::Ec && self.crv.as_deref() != alg.curve() {
            return Err(CryptoError::invalid_descriptor(format!(
                "crv {:?} does not match {}",
                self.crv, alg
            )));
        }

        if let Some(ops) = &self.key_ops {
            if !ops.iter().any(|op| op == "verify") {
                return Err(CryptoError::KeyUsageMismatch {
                    reason: format!("key_ops {:?} lacks \"verify\"", ops),
                });
            }
        }

        if let Some(key_use) = self.key_use.as_deref() {
            if key_use != "sig" {
                return Err(CryptoError::KeyUsageMismatch {
                    reason: format!("use is {:?}, expected \"sig\"", key_use),
                });
            }
        }

        Ok(alg)
    }

    /// Decode a base64url key member such as `n` or `x`.
    pub fn component(&self, name: &'static str) -> Result<Vec<u8>, CryptoError> {
        let value = match name {
            "n" => self.n.as_deref(),
            "e" => self.e.as_deref(),
            "x" => self.x.as_deref(),
            "y" => self.y.as_deref(),
            _ => None,
        }
        .ok_or_else(|| CryptoError::invalid_descriptor(format!("missing {:?} member", name)))?;

        let bytes = JWK_B64
            .decode(value)
            .map_err(|e| CryptoError::invalid_encoding(name, e.to_string()))?;
        if bytes.is_empty() {
            return Err(CryptoError::invalid_descriptor(format!("empty {:?} member", name)));
        }
        Ok(bytes)
    }

    /// Encode raw bytes as a JWK member value (unpadded base64url).
    #[must_use]
    pub fn encode_component(bytes: &[u8]) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}
