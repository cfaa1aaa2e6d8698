// crates/citeledger-core/src/transaction.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::author::AuthorId;
use crate::paper::CitationId;

pub type TransactionId = Uuid;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// New tokens issued to an author.
    Mint,
    /// Tokens removed from an author's balance and from circulation.
    Burn,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Mint => write!(f, "MINT"),
            TransactionKind::Burn => write!(f, "BURN"),
        }
    }
}

/// An append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransaction {
    pub id: TransactionId,
    pub author_id: AuthorId,
    /// Magnitude of the transfer, always >= 0. The sign comes from `kind`.
    pub amount: f64,
    pub kind: TransactionKind,
    pub reason: String,
    /// Citation that triggered this mint, when minted through the keyed path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_id: Option<CitationId>,
    pub created_at: DateTime<Utc>,
}

impl TokenTransaction {
    pub fn mint(author_id: AuthorId, amount: f64, reason: impl Into<String>) -> Self {
        Self::build(author_id, amount, TransactionKind::Mint, reason.into())
    }

    pub fn burn(author_id: AuthorId, amount: f64, reason: impl Into<String>) -> Self {
        Self::build(author_id, amount, TransactionKind::Burn, reason.into())
    }

    pub fn for_citation(mut self, citation_id: CitationId) -> Self {
        self.citation_id = Some(citation_id);
        self
    }

    /// Effect of this entry on the author's balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Mint => self.amount,
            TransactionKind::Burn => -self.amount,
        }
    }

    fn build(author_id: AuthorId, amount: f64, kind: TransactionKind, reason: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            author_id,
            amount,
            kind,
            reason,
            citation_id: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amount_follows_kind() {
        let author = Uuid::now_v7();
        assert_eq!(TokenTransaction::mint(author, 2.0, "reward").signed_amount(), 2.0);
        assert_eq!(TokenTransaction::burn(author, 0.5, "fee").signed_amount(), -0.5);
    }

    #[test]
    fn kind_serializes_uppercase() {
        let json = serde_json::to_string(&TransactionKind::Burn).unwrap();
        assert_eq!(json, "\"BURN\"");
        assert_eq!(TransactionKind::Mint.to_string(), "MINT");
    }
}
