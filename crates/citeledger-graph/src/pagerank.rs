// crates/citeledger-graph/src/pagerank.rs
//
// PageRank authority scores for papers in the citation graph.
//
// A citation A -> B passes a share of A's rank to B. Papers that cite nothing
// (dangling nodes) spread their rank uniformly over every paper, so the
// vector always sums to 1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use citeledger_core::PaperId;

use crate::graph::CitationGraph;

/// Configuration for the PageRank power iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Probability of following a citation vs. teleporting. Default: 0.85.
    pub damping_factor: f64,
    /// Maximum iterations. Default: 100.
    pub max_iterations: u32,
    /// Convergence threshold (L1 norm of score change). Default: 1e-6.
    pub convergence_threshold: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            convergence_threshold: 1e-6,
        }
    }
}

impl PageRankConfig {
    /// Default config with a caller-chosen damping factor.
    pub fn with_damping(damping_factor: f64) -> Self {
        Self {
            damping_factor,
            ..Self::default()
        }
    }
}

/// Paper with its citation-derived authority score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPaper {
    pub paper_id: PaperId,
    pub title: String,
    /// PageRank value; all scores in a graph sum to 1.
    pub authority_score: f64,
    /// Number of incoming citations.
    pub citation_count: u64,
    /// Number of outgoing references.
    pub reference_count: u64,
}

/// Compute PageRank for every paper in the graph.
///
/// Power iteration, for every paper v:
///   new(v) = (1 - d) / N + d * (sum_{u -> v} rank(u) / outdeg(u) + dangling / N)
/// where `dangling` is the total rank held by papers with no references.
/// Parallel edges each carry `rank(u) / outdeg(u)`.
///
/// Stops after `max_iterations` or once the L1 change drops below
/// `convergence_threshold`, returning the last vector either way.
pub fn compute_pagerank(graph: &CitationGraph, config: &PageRankConfig) -> HashMap<PaperId, f64> {
    let ids = graph.paper_ids();
    let n = ids.len();
    if n == 0 {
        return HashMap::new();
    }
    let index: HashMap<PaperId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    // Incoming sources per node, by index, and out-degree per node.
    let sources: Vec<Vec<usize>> = ids
        .iter()
        .map(|&id| graph.in_edges(id).iter().filter_map(|src| index.get(src).copied()).collect())
        .collect();
    let out_degree: Vec<usize> = ids.iter().map(|&id| graph.out_edges(id).len()).collect();

    let uniform = 1.0 / n as f64;
    let d = config.damping_factor;
    let teleport = (1.0 - d) * uniform;
    let mut scores = vec![uniform; n];
    let mut converged = false;

    for iteration in 0..config.max_iterations {
        let dangling_sum: f64 = scores
            .iter()
            .zip(&out_degree)
            .filter(|(_, deg)| **deg == 0)
            .map(|(&s, _)| s)
            .sum();
        let dangling_share = dangling_sum * uniform;

        let new_scores: Vec<f64> = sources
            .iter()
            .map(|srcs| {
                let inflow: f64 = srcs
                    .iter()
                    .map(|&u| scores[u] / out_degree[u] as f64)
                    .sum();
                teleport + d * (inflow + dangling_share)
            })
            .collect();

        let delta: f64 = scores
            .iter()
            .zip(&new_scores)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = new_scores;
        if delta < config.convergence_threshold {
            tracing::debug!("PageRank converged after {} iterations", iteration + 1);
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::debug!(
            "PageRank stopped at max_iterations={} without converging",
            config.max_iterations
        );
    }

    ids.iter().copied().zip(scores).collect()
}

/// Build a ranked, truncated list of papers from a score vector.
pub fn rank_papers(
    graph: &CitationGraph,
    scores: &HashMap<PaperId, f64>,
    limit: usize,
) -> Vec<ScoredPaper> {
    let mut papers: Vec<ScoredPaper> = graph
        .papers()
        .map(|paper| ScoredPaper {
            paper_id: paper.id,
            title: paper.title.clone(),
            authority_score: scores.get(&paper.id).copied().unwrap_or(0.0),
            citation_count: graph.citation_count(&paper.id),
            reference_count: graph.reference_count(&paper.id),
        })
        .collect();

    // Stable sort keeps registration order among ties.
    papers.sort_by(|a, b| b.authority_score.total_cmp(&a.authority_score));
    papers.truncate(limit);
    papers
}
