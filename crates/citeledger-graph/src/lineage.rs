// crates/citeledger-graph/src/lineage.rs
//
// Breadth-first lineage traversal: which papers a paper builds on, and which
// papers build on it, up to a hop limit.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use citeledger_core::PaperId;

use crate::graph::CitationGraph;

/// Direction for lineage traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Follow references (papers cited by this paper).
    Forward,
    /// Follow citations (papers citing this paper).
    Backward,
    /// Both directions.
    Both,
}

/// A paper reached during traversal and its hop distance from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEntry {
    pub paper_id: PaperId,
    pub depth: usize,
}

/// Traverse up to `max_depth` hops from `start`.
///
/// Each paper appears once, at its shortest distance. The start paper is not
/// included. Unknown start papers yield an empty result.
pub fn trace_lineage(
    graph: &CitationGraph,
    start: PaperId,
    max_depth: usize,
    direction: Direction,
) -> Vec<LineageEntry> {
    if graph.paper(&start).is_none() {
        return Vec::new();
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);
    let mut result = Vec::new();

    while let Some((current, depth)) = queue.pop_front() {
        if depth == max_depth {
            continue;
        }
        let forward: &[PaperId] = match direction {
            Direction::Forward | Direction::Both => graph.out_edges(current),
            Direction::Backward => &[],
        };
        let backward: &[PaperId] = match direction {
            Direction::Backward | Direction::Both => graph.in_edges(current),
            Direction::Forward => &[],
        };

        for &neighbor in forward.iter().chain(backward) {
            if visited.insert(neighbor) {
                result.push(LineageEntry {
                    paper_id: neighbor,
                    depth: depth + 1,
                });
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    result
}
