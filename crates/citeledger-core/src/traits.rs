// crates/citeledger-core/src/traits.rs

use crate::author::AuthorId;
use crate::error::LedgerError;

/// Identity verification for callers of mutating operations.
///
/// Implemented by `crypto::KeyRegistry` (ed25519). The ledger core trusts the
/// author id this returns and performs no cryptography of its own.
pub trait AuthSystem: Send + Sync {
    /// Bind a public key to an author id.
    fn register_key(&mut self, author_id: AuthorId, public_key: &str) -> Result<(), LedgerError>;

    /// Verify `signature` over `message` and return the author bound to `public_key`.
    ///
    /// Returns `LedgerError::Unauthenticated` on any rejection.
    fn verify_author(
        &self,
        public_key: &str,
        message: &[u8],
        signature: &str,
    ) -> Result<AuthorId, LedgerError>;
}

/// Source of per-author citation totals for the emission engine.
///
/// Implemented by `citeledger_graph::CitationGraph`.
pub trait CitationCounter {
    /// Total incoming citations across every paper the author wrote.
    /// Zero for unknown authors.
    fn author_citation_count(&self, author_id: &AuthorId) -> u64;
}
