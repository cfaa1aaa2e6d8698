// crates/citeledger-economics/src/lib.rs
//
// citeledger-economics: citation reward curve and the token emission engine
// for CiteLedger.
//
// Balances are plain f64 token amounts. The engine never reads the citation
// graph directly; it asks a `CitationCounter` for per-author totals at mint
// time.

pub mod curve;
pub mod engine;

// Re-export key types for ergonomic access from downstream crates.
pub use curve::{CitationCurve, BASE_MINT_RATE, CITATION_DECAY, MAX_CITATIONS_FOR_MINT};
pub use engine::{TokenEmissionEngine, TokenStats, LEDGER_TOLERANCE};
