//! Shared keys, signed records and in-memory directory channels.

use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use roster_crypto::{encode_field, KeyDescriptor};
use roster_verify_core::{Channel, DirectoryChannel, UserRecord, VerifyError};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256, Sha384};

pub fn rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

pub fn other_rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

/// `base64(json(jwk))` for an RS384 key.
pub fn rs384_public_key_field(key: &RsaPrivateKey) -> String {
    let public = key.to_public_key();
    let jwk = KeyDescriptor {
        kty: "RSA".into(),
        alg: Some("RS384".into()),
        n: Some(KeyDescriptor::encode_component(&public.n().to_bytes_be())),
        e: Some(KeyDescriptor::encode_component(&public.e().to_bytes_be())),
        key_ops: Some(vec!["verify".into()]),
        ext: Some(true),
        ..Default::default()
    };
    encode_field(&serde_json::to_vec(&jwk).unwrap())
}

pub fn email_hash(email: &str) -> Vec<u8> {
    Sha256::digest(email.as_bytes()).to_vec()
}

pub fn sign_rs384(key: &RsaPrivateKey, data: &[u8]) -> Vec<u8> {
    SigningKey::<Sha384>::new(key.clone()).sign(data).to_vec()
}

pub fn unsigned_record(id: &str, email: &str) -> UserRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": email,
        "role": "user",
        "status": "active",
        "createdAt": "2024-03-01T12:00:00Z",
    }))
    .unwrap()
}

pub fn signed_record(id: &str, email: &str) -> UserRecord {
    let hash = email_hash(email);
    let mut record = unsigned_record(id, email);
    record.email_hash = Some(encode_field(&hash));
    record.signature = Some(encode_field(&sign_rs384(rsa_key(), &hash)));
    record.public_key = Some(rs384_public_key_field(rsa_key()));
    record
}

/// A signed record with bit `bit` of signature byte `byte` flipped.
pub fn tampered_record(id: &str, email: &str, byte: usize, bit: u8) -> UserRecord {
    let hash = email_hash(email);
    let mut signature = sign_rs384(rsa_key(), &hash);
    let i = byte % signature.len();
    signature[i] ^= 1 << (bit % 8);

    let mut record = unsigned_record(id, email);
    record.email_hash = Some(encode_field(&hash));
    record.signature = Some(encode_field(&signature));
    record.public_key = Some(rs384_public_key_field(rsa_key()));
    record
}

/// Canned reply for one channel.
#[derive(Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
}

/// In-memory directory with call tracking.
pub struct FakeDirectory {
    binary: Reply,
    structured: Reply,
    calls: Mutex<Vec<Channel>>,
}

impl FakeDirectory {
    pub fn new(binary: Reply, structured: Reply) -> Self {
        Self {
            binary,
            structured,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Channel> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, channel: Channel, reply: &Reply) -> Result<Vec<u8>, VerifyError> {
        self.calls.lock().unwrap().push(channel);
        match reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Status(code) => Err(VerifyError::channel(channel, format!("HTTP {}", code))),
        }
    }
}

#[async_trait]
impl DirectoryChannel for FakeDirectory {
    async fn fetch_binary(&self) -> Result<Vec<u8>, VerifyError> {
        self.reply(Channel::Binary, &self.binary)
    }

    async fn fetch_structured(&self) -> Result<Vec<u8>, VerifyError> {
        self.reply(Channel::Structured, &self.structured)
    }
}

/// `{"users": [...]}` body for the given records.
pub fn wrapped_body(records: &[UserRecord]) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "users": records })).unwrap()
}

/// `[...]` body for the given records.
pub fn bare_body(records: &[UserRecord]) -> Vec<u8> {
    serde_json::to_vec(records).unwrap()
}
