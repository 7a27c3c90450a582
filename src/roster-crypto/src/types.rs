//! Signature algorithm identifiers as named by JSON Web Key descriptors.

use serde::{Deserialize, Serialize};

/// Digest function bound to a signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl DigestAlgorithm {
    /// WebCrypto-style name (`SHA-384`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

/// Key family expected by an algorithm (`kty` in a JWK).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA public key (`n`, `e`).
    Rsa,
    /// Elliptic-curve public key (`crv`, `x`, `y`).
    Ec,
}

impl KeyType {
    /// The `kty` member value.
    #[must_use]
    pub const fn jwk_name(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
        }
    }
}

/// Signature scheme selected by the `alg` member of a key descriptor.
///
/// The descriptor always names its own scheme and digest; there is no
/// fallback when `alg` is missing or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256 = 1,

    /// RSASSA-PKCS1-v1_5 with SHA-384
    /// Scheme used by the user directory's signing service.
    Rs384 = 2,

    /// RSASSA-PKCS1-v1_5 with SHA-512
    Rs512 = 3,

    /// ECDSA P-256 with SHA-256, signature as raw `r || s`
    Es256 = 10,

    /// ECDSA P-384 with SHA-384, signature as raw `r || s`
    Es384 = 11,
}

impl SignatureAlgorithm {
    /// Parse the JWK `alg` member (RFC 7518 §3.1).
    #[must_use]
    pub fn from_jwk_alg(alg: &str) -> Option<Self> {
        match alg {
            "RS256" => Some(Self::Rs256),
            "RS384" => Some(Self::Rs384),
            "RS512" => Some(Self::Rs512),
            "ES256" => Some(Self::Es256),
            "ES384" => Some(Self::Es384),
            _ => None,
        }
    }

    /// The JWK `alg` member value.
    #[must_use]
    pub const fn jwk_name(&self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
        }
    }

    /// Digest applied to the signed data before the signature primitive.
    #[must_use]
    pub const fn digest(&self) -> DigestAlgorithm {
        match self {
            Self::Rs256 | Self::Es256 => DigestAlgorithm::Sha256,
            Self::Rs384 | Self::Es384 => DigestAlgorithm::Sha384,
            Self::Rs512 => DigestAlgorithm::Sha512,
        }
    }

    /// Key family this algorithm requires.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        match self {
            Self::Rs256 | Self::Rs384 | Self::Rs512 => KeyType::Rsa,
            Self::Es256 | Self::Es384 => KeyType::Ec,
        }
    }

    /// Curve name (`crv`) for EC algorithms.
    #[must_use]
    pub const fn curve(&self) -> Option<&'static str> {
        match self {
            Self::Es256 => Some("P-256"),
            Self::Es384 => Some("P-384"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.jwk_name())
    }
}
