// crates/citeledger-service/src/shared.rs
//
// LedgerSharedState: the citation graph, emission engine, and key registry,
// each behind its own async reader/writer lock.
//
// Lock order is always graph -> engine -> auth. Every code path that holds
// more than one of these acquires them in that order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use citeledger_core::AuthSystem;
use citeledger_economics::TokenEmissionEngine;
use citeledger_graph::CitationGraph;

use crate::config::ServiceConfig;

/// Shared mutable state for the service, wrapped in Arc<RwLock<>> for
/// safe concurrent access from multiple tokio tasks.
pub struct LedgerSharedState<A> {
    /// Papers, citations, and cached authority scores.
    pub graph: Arc<RwLock<CitationGraph>>,
    /// Author balances and the transaction ledger.
    pub engine: Arc<RwLock<TokenEmissionEngine>>,
    /// Public-key registry used to authenticate callers.
    pub auth: Arc<RwLock<A>>,
    /// Construction time, for uptime reporting.
    pub start_time: Instant,
}

impl<A: AuthSystem> LedgerSharedState<A> {
    /// Build empty components configured from `config`.
    pub fn new(config: &ServiceConfig, auth: A) -> Self {
        Self {
            graph: Arc::new(RwLock::new(CitationGraph::with_policy(
                config.duplicate_citations,
            ))),
            engine: Arc::new(RwLock::new(TokenEmissionEngine::with_curve(
                config.emission.clone(),
            ))),
            auth: Arc::new(RwLock::new(auth)),
            start_time: Instant::now(),
        }
    }

    /// Time elapsed since the state was built.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl<A> Clone for LedgerSharedState<A> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            engine: Arc::clone(&self.engine),
            auth: Arc::clone(&self.auth),
            start_time: self.start_time,
        }
    }
}
