// crates/citeledger-graph/src/lib.rs
//
// citeledger-graph: Citation graph, PageRank authority scores, lineage
// traversal, and structural statistics for CiteLedger.
//
// The graph owns every Paper and Citation record. Authority scores are
// PageRank over citation edges with dangling-mass redistribution; the emission
// engine reads per-author citation totals through `CitationCounter`.

pub mod graph;
pub mod lineage;
pub mod pagerank;
pub mod stats;

pub use graph::{CitationGraph, DuplicateCitationPolicy};
pub use lineage::{trace_lineage, Direction, LineageEntry};
pub use pagerank::{compute_pagerank, rank_papers, PageRankConfig, ScoredPaper};
pub use stats::{compute_network_stats, is_acyclic, NetworkStats};
