// crates/citeledger-graph/src/stats.rs
//
// Structural statistics for the citation graph, including cycle detection.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use citeledger_core::PaperId;

use crate::graph::CitationGraph;

/// Snapshot of graph-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_papers: usize,
    /// Number of accepted citation records.
    pub total_citations: usize,
    /// Mean in-degree over all papers. 0.0 for an empty graph.
    pub average_citations: f64,
    /// Largest in-degree of any paper.
    pub max_citations: u64,
    /// Linked pairs / (|V| * (|V| - 1)), so never above 1.0 even with parallel
    /// edges; 0.0 when there are fewer than two papers.
    pub density: f64,
    /// Whether the graph has no directed cycle. True for empty graphs.
    pub is_dag: bool,
}

pub fn compute_network_stats(graph: &CitationGraph) -> NetworkStats {
    let total_papers = graph.paper_count();
    let counts: Vec<u64> = graph
        .paper_ids()
        .iter()
        .map(|id| graph.citation_count(id))
        .collect();

    let average_citations = if counts.is_empty() {
        0.0
    } else {
        counts.iter().sum::<u64>() as f64 / counts.len() as f64
    };
    let max_citations = counts.iter().copied().max().unwrap_or(0);

    let density = if total_papers > 1 {
        let n = total_papers as f64;
        graph.linked_pair_count() as f64 / (n * (n - 1.0))
    } else {
        0.0
    };

    NetworkStats {
        total_papers,
        total_citations: graph.citation_record_count(),
        average_citations,
        max_citations,
        density,
        is_dag: is_acyclic(graph),
    }
}

/// Kahn's algorithm: the graph is acyclic iff every node can be peeled off
/// in topological order.
pub fn is_acyclic(graph: &CitationGraph) -> bool {
    let ids = graph.paper_ids();
    let mut in_degree: HashMap<PaperId, usize> = ids
        .iter()
        .map(|&id| (id, graph.in_edges(id).len()))
        .collect();

    let mut ready: VecDeque<PaperId> = ids
        .iter()
        .copied()
        .filter(|id| in_degree.get(id).copied() == Some(0))
        .collect();

    let mut visited = 0usize;
    while let Some(current) = ready.pop_front() {
        visited += 1;
        for target in graph.out_edges(current) {
            if let Some(remaining) = in_degree.get_mut(target) {
                *remaining -= 1;
                if *remaining == 0 {
                    ready.push_back(*target);
                }
            }
        }
    }

    visited == ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DuplicateCitationPolicy;
    use citeledger_core::{Citation, Paper};
    use uuid::Uuid;

    fn graph_with(nodes: u128, edges: &[(u128, u128)]) -> CitationGraph {
        graph_with_policy(DuplicateCitationPolicy::default(), nodes, edges)
    }

    fn graph_with_policy(
        policy: DuplicateCitationPolicy,
        nodes: u128,
        edges: &[(u128, u128)],
    ) -> CitationGraph {
        let mut graph = CitationGraph::with_policy(policy);
        for n in 1..=nodes {
            graph
                .add_paper(Paper {
                    id: Uuid::from_u128(n),
                    ..Paper::new(format!("P{}", n), vec![Uuid::from_u128(77)])
                })
                .unwrap();
        }
        for &(from, to) in edges {
            graph
                .add_citation(Citation::new(Uuid::from_u128(from), Uuid::from_u128(to)))
                .unwrap();
        }
        graph
    }

    #[test]
    fn empty_graph_stats() {
        let stats = compute_network_stats(&CitationGraph::new());
        assert_eq!(stats.total_papers, 0);
        assert_eq!(stats.total_citations, 0);
        assert_eq!(stats.average_citations, 0.0);
        assert_eq!(stats.max_citations, 0);
        assert_eq!(stats.density, 0.0);
        assert!(stats.is_dag);
    }

    #[test]
    fn single_node_is_dag_with_zero_density() {
        let stats = compute_network_stats(&graph_with(1, &[]));
        assert_eq!(stats.total_papers, 1);
        assert_eq!(stats.density, 0.0);
        assert!(stats.is_dag);
    }

    #[test]
    fn counts_and_density() {
        // 3 nodes, 6 possible edges, 3 present.
        let stats = compute_network_stats(&graph_with(3, &[(1, 2), (3, 2), (2, 3)]));
        assert_eq!(stats.total_citations, 3);
        assert_eq!(stats.max_citations, 2);
        assert!((stats.average_citations - 1.0).abs() < 1e-12);
        assert!((stats.density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cycle_detected() {
        assert!(!is_acyclic(&graph_with(3, &[(1, 2), (2, 3), (3, 1)])));
        assert!(!is_acyclic(&graph_with(2, &[(1, 2), (2, 1)])));
    }

    #[test]
    fn chain_and_diamond_are_dags() {
        assert!(is_acyclic(&graph_with(3, &[(1, 2), (2, 3)])));
        assert!(is_acyclic(&graph_with(4, &[(1, 2), (1, 3), (2, 4), (3, 4)])));
    }

    #[test]
    fn parallel_edges_do_not_fake_a_cycle() {
        let graph = graph_with_policy(DuplicateCitationPolicy::CountEach, 2, &[(1, 2), (1, 2)]);
        assert!(is_acyclic(&graph));
    }

    #[test]
    fn repeated_citation_counts_once_by_default() {
        let stats = compute_network_stats(&graph_with(2, &[(2, 1), (2, 1)]));
        assert_eq!(stats.total_citations, 2);
        assert_eq!(stats.max_citations, 1);
        assert!((stats.density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn density_ignores_parallel_edges() {
        let graph = graph_with_policy(
            DuplicateCitationPolicy::CountEach,
            2,
            &[(2, 1), (2, 1), (2, 1), (1, 2)],
        );
        let stats = compute_network_stats(&graph);
        assert_eq!(stats.max_citations, 3);
        assert!((stats.density - 1.0).abs() < 1e-12);
    }
}
