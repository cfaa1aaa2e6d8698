// crates/citeledger-core/src/crypto.rs
//
// ed25519 signing helpers and the public-key registry used to authenticate
// authors. Keys and signatures travel as lowercase hex strings.

use std::collections::HashMap;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::author::AuthorId;
use crate::error::LedgerError;
use crate::traits::AuthSystem;

/// An ed25519 keypair for signing and verification.
pub struct Keypair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// Rebuild a keypair from a hex-encoded 32-byte signing key.
    pub fn from_signing_key_hex(signing_key_hex: &str) -> Result<Self, LedgerError> {
        let bytes = decode_32(signing_key_hex, "signing key")?;
        let signing_key = SigningKey::from_bytes(&bytes);
        let verifying_key = signing_key.verifying_key();
        Ok(Keypair {
            signing_key,
            verifying_key,
        })
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    pub fn signing_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign a message and return the hex-encoded 64-byte signature.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.signing_key.sign(message).to_bytes())
    }

    /// Sign `message` and package it with this key's public half.
    pub fn credentials(&self, message: impl Into<String>) -> Credentials {
        let message = message.into();
        Credentials {
            public_key: self.public_key_hex(),
            signature: self.sign_hex(message.as_bytes()),
            message,
        }
    }
}

/// The `(public key, message, signature)` triple a caller presents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub public_key: String,
    pub message: String,
    pub signature: String,
}

/// Verify a hex-encoded ed25519 signature.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify and
/// `Err` when the key or signature cannot be decoded.
pub fn verify_signature(
    public_key_hex: &str,
    message: &[u8],
    signature_hex: &str,
) -> Result<bool, LedgerError> {
    let key_bytes = decode_32(public_key_hex, "public key")?;
    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| LedgerError::Crypto(format!("Invalid public key: {}", e)))?;

    let signature_bytes = hex::decode(signature_hex)?;
    let signature_array: [u8; 64] = signature_bytes
        .as_slice()
        .try_into()
        .map_err(|_| LedgerError::Crypto("Signature must be exactly 64 bytes".to_string()))?;
    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Short SHA-256 fingerprint of a public key, for log lines.
pub fn key_fingerprint(public_key_hex: &str) -> String {
    let digest = Sha256::digest(public_key_hex.to_ascii_lowercase().as_bytes());
    hex::encode(&digest[..8])
}

fn decode_32(value: &str, what: &str) -> Result<[u8; 32], LedgerError> {
    let bytes = hex::decode(value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| LedgerError::Crypto(format!("{} must be exactly 32 bytes", what)))
}

/// In-memory map from public key to author id.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: HashMap<String, AuthorId>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Author bound to `public_key`, if any.
    pub fn author_for_key(&self, public_key: &str) -> Option<AuthorId> {
        self.keys.get(&public_key.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl AuthSystem for KeyRegistry {
    fn register_key(&mut self, author_id: AuthorId, public_key: &str) -> Result<(), LedgerError> {
        let normalized = public_key.to_ascii_lowercase();
        let key_bytes = decode_32(&normalized, "public key")?;
        VerifyingKey::from_bytes(&key_bytes)?;

        if let Some(existing) = self.keys.get(&normalized) {
            return Err(LedgerError::DuplicateId(format!(
                "public key {} is already bound to author {}",
                key_fingerprint(&normalized),
                existing
            )));
        }
        self.keys.insert(normalized, author_id);
        Ok(())
    }

    fn verify_author(
        &self,
        public_key: &str,
        message: &[u8],
        signature: &str,
    ) -> Result<AuthorId, LedgerError> {
        let author_id = self.author_for_key(public_key).ok_or_else(|| {
            LedgerError::Unauthenticated(format!(
                "unregistered public key {}",
                key_fingerprint(public_key)
            ))
        })?;

        match verify_signature(public_key, message, signature) {
            Ok(true) => Ok(author_id),
            Ok(false) => Err(LedgerError::Unauthenticated(
                "signature does not match message".to_string(),
            )),
            Err(e) => Err(LedgerError::Unauthenticated(e.to_string())),
        }
    }
}
