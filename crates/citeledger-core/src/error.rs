// crates/citeledger-core/src/error.rs

use thiserror::Error;
use uuid::Uuid;

/// Error taxonomy shared by every CiteLedger crate.
///
/// Business-rule violations (self-citation, over-burn, duplicate ids) are
/// returned as values; none of the core operations panic on them.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Referenced paper, author, or citation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request violates a structural rule (self-citation, empty author set,
    /// rejected duplicate citation, malformed amount).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An entity with this id is already registered.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Burn exceeds the author's current balance.
    #[error("Insufficient balance: requested {requested} but only {available} available")]
    InsufficientBalance { requested: f64, available: f64 },

    /// A mint for this (citation, author) pair has already been recorded.
    #[error("Citation {citation_id} already minted for author {author_id}")]
    AlreadyMinted { citation_id: Uuid, author_id: Uuid },

    /// Caller identity could not be verified.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed key or signature material.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Internal inconsistency, e.g. a ledger that no longer balances.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<ed25519_dalek::SignatureError> for LedgerError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        LedgerError::Crypto(e.to_string())
    }
}

impl From<hex::FromHexError> for LedgerError {
    fn from(e: hex::FromHexError) -> Self {
        LedgerError::Crypto(format!("Invalid hex encoding: {}", e))
    }
}
