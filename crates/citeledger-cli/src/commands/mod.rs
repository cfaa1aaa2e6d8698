// crates/citeledger-cli/src/commands/mod.rs
//
// Command module declarations for the CiteLedger CLI.

pub mod keygen;
pub mod replay;
pub mod sign;
