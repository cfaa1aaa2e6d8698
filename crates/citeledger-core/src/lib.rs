// crates/citeledger-core/src/lib.rs
//
// citeledger-core: Core types, traits, and key registry for CiteLedger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the paper/citation/author/transaction records, the shared error
// taxonomy, and the traits at the seams between the citation graph, the
// emission engine, and caller authentication.

pub mod author;
pub mod crypto;
pub mod error;
pub mod paper;
pub mod traits;
pub mod transaction;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use citeledger_core::Paper;`

pub use author::{Author, AuthorId};
pub use paper::{Citation, CitationId, Paper, PaperId};
pub use transaction::{TokenTransaction, TransactionId, TransactionKind};

pub use crypto::{Credentials, KeyRegistry, Keypair};

// Error type
pub use error::LedgerError;

// Traits
pub use traits::{AuthSystem, CitationCounter};
