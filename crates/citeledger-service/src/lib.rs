// crates/citeledger-service/src/lib.rs
//
// citeledger-service: the citation graph, emission engine, and key registry
// composed behind async reader/writer locks, with TOML configuration.

pub mod config;
pub mod service;
pub mod shared;

pub use config::ServiceConfig;
pub use service::{CitationReceipt, CitationService, MintOutcome, MintStatus};
pub use shared::LedgerSharedState;
