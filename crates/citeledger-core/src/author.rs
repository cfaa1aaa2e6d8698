// crates/citeledger-core/src/author.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AuthorId = Uuid;

/// A registered author.
///
/// `token_balance` is owned by the emission engine; nothing else mutates it
/// once the author is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    /// Hex-encoded ed25519 verifying key (32 bytes).
    pub public_key: String,
    /// Current balance. Never negative.
    pub token_balance: f64,
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// Create an author with a fresh id and a zero balance.
    pub fn new(name: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            public_key: public_key.into(),
            token_balance: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Set an opening balance. The engine records it as a mint on registration.
    pub fn with_balance(mut self, balance: f64) -> Self {
        self.token_balance = balance;
        self
    }
}
