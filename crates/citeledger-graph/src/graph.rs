// crates/citeledger-graph/src/graph.rs
//
// In-memory citation graph: papers are nodes, citations are directed edges
// from the citing paper to the cited paper.
//
// The graph owns every Paper and Citation record. Cycles are allowed; DAG-ness
// is reported by `network_stats`, never enforced.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use citeledger_core::{AuthorId, Citation, CitationCounter, CitationId, LedgerError, Paper, PaperId};

use crate::lineage::{trace_lineage, Direction, LineageEntry};
use crate::pagerank::{compute_pagerank, rank_papers, PageRankConfig, ScoredPaper};
use crate::stats::{compute_network_stats, NetworkStats};

/// How a second citation between an already-linked pair is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCitationPolicy {
    /// Keep every record and add a parallel edge; the pair counts once per record.
    CountEach,
    /// Keep the record but do not add a parallel edge.
    #[default]
    CountOnce,
    /// Refuse the second citation with a validation error.
    Reject,
}

#[derive(Debug)]
struct RankCache {
    config: PageRankConfig,
    scores: Arc<HashMap<PaperId, f64>>,
}

/// Directed citation graph with memoized authority scores.
#[derive(Debug)]
pub struct CitationGraph {
    papers: HashMap<PaperId, Paper>,
    /// Registration order of papers.
    paper_order: Vec<PaperId>,
    citations: HashMap<CitationId, Citation>,
    /// Record order of citations.
    citation_order: Vec<CitationId>,
    /// Adjacency list: paper_id -> papers it cites (one entry per edge).
    outgoing: HashMap<PaperId, Vec<PaperId>>,
    /// Reverse adjacency: paper_id -> papers citing it (one entry per edge).
    incoming: HashMap<PaperId, Vec<PaperId>>,
    edge_count: usize,
    policy: DuplicateCitationPolicy,
    /// Last PageRank vector, dropped on every node or edge mutation.
    rank_cache: Mutex<Option<RankCache>>,
}

impl CitationGraph {
    /// Create an empty graph with the default duplicate policy.
    pub fn new() -> Self {
        Self::with_policy(DuplicateCitationPolicy::default())
    }

    /// Create an empty graph with an explicit duplicate-citation policy.
    pub fn with_policy(policy: DuplicateCitationPolicy) -> Self {
        Self {
            papers: HashMap::new(),
            paper_order: Vec::new(),
            citations: HashMap::new(),
            citation_order: Vec::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            edge_count: 0,
            policy,
            rank_cache: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> DuplicateCitationPolicy {
        self.policy
    }

    /// Register a paper as a node.
    ///
    /// Repeated author ids are collapsed, keeping first-listed order.
    ///
    /// # Errors
    /// `DuplicateId` if the id is taken, `Validation` if the author set is empty.
    pub fn add_paper(&mut self, mut paper: Paper) -> Result<(), LedgerError> {
        if self.papers.contains_key(&paper.id) {
            return Err(LedgerError::DuplicateId(format!("paper {}", paper.id)));
        }
        if paper.authors.is_empty() {
            return Err(LedgerError::Validation(format!(
                "paper {} must have at least one author",
                paper.id
            )));
        }

        paper.authors = distinct(&paper.authors);

        tracing::debug!("Registered paper {} ({} authors)", paper.id, paper.authors.len());
        self.paper_order.push(paper.id);
        self.papers.insert(paper.id, paper);
        self.invalidate_ranks();
        Ok(())
    }

    /// Record a citation edge.
    ///
    /// Fails without side effects when either endpoint is unknown
    /// (`NotFound`), when the citation is a self-citation (`Validation`), when
    /// the citation id is reused (`DuplicateId`), or when the pair is already
    /// linked under `DuplicateCitationPolicy::Reject`.
    pub fn add_citation(&mut self, citation: Citation) -> Result<(), LedgerError> {
        let citing = citation.citing_paper_id;
        let cited = citation.cited_paper_id;

        for endpoint in [citing, cited] {
            if !self.papers.contains_key(&endpoint) {
                return Err(LedgerError::NotFound(format!("paper {}", endpoint)));
            }
        }
        if citation.is_self_citation() {
            return Err(LedgerError::Validation(format!(
                "paper {} cannot cite itself",
                citing
            )));
        }
        if self.citations.contains_key(&citation.id) {
            return Err(LedgerError::DuplicateId(format!("citation {}", citation.id)));
        }

        let already_linked = self.out_edges(citing).contains(&cited);
        let add_edge = match (self.policy, already_linked) {
            (DuplicateCitationPolicy::Reject, true) => {
                return Err(LedgerError::Validation(format!(
                    "paper {} already cites {}",
                    citing, cited
                )));
            }
            (DuplicateCitationPolicy::CountOnce, true) => false,
            _ => true,
        };

        if add_edge {
            self.outgoing.entry(citing).or_default().push(cited);
            self.incoming.entry(cited).or_default().push(citing);
            self.edge_count += 1;
        }

        if let Some(paper) = self.papers.get_mut(&citing) {
            if !paper.citations.contains(&cited) {
                paper.citations.push(cited);
            }
        }

        tracing::debug!("Recorded citation {}: {} -> {}", citation.id, citing, cited);
        self.citation_order.push(citation.id);
        self.citations.insert(citation.id, citation);
        self.invalidate_ranks();
        Ok(())
    }

    /// Look up a paper by id.
    pub fn paper(&self, paper_id: &PaperId) -> Option<&Paper> {
        self.papers.get(paper_id)
    }

    /// All papers, in registration order.
    pub fn papers(&self) -> impl Iterator<Item = &Paper> {
        self.paper_order.iter().filter_map(|id| self.papers.get(id))
    }

    /// Paper ids in registration order.
    pub fn paper_ids(&self) -> &[PaperId] {
        &self.paper_order
    }

    pub fn citation(&self, citation_id: &CitationId) -> Option<&Citation> {
        self.citations.get(citation_id)
    }

    /// All citation records, in the order they were accepted.
    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.citation_order.iter().filter_map(|id| self.citations.get(id))
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    /// Number of citation records (may exceed `edge_count` under `CountOnce`).
    pub fn citation_record_count(&self) -> usize {
        self.citations.len()
    }

    /// Number of stored edges, parallel edges included.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of distinct (citing, cited) pairs joined by at least one edge.
    pub fn linked_pair_count(&self) -> usize {
        self.outgoing.values().map(|targets| distinct(targets).len()).sum()
    }

    /// Raw outgoing edge targets of a paper, one entry per edge.
    pub fn out_edges(&self, paper_id: PaperId) -> &[PaperId] {
        self.outgoing.get(&paper_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Raw incoming edge sources of a paper, one entry per edge.
    pub fn in_edges(&self, paper_id: PaperId) -> &[PaperId] {
        self.incoming.get(&paper_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// In-degree of a paper. Zero for unknown papers.
    pub fn citation_count(&self, paper_id: &PaperId) -> u64 {
        self.in_edges(*paper_id).len() as u64
    }

    /// Out-degree of a paper. Zero for unknown papers.
    pub fn reference_count(&self, paper_id: &PaperId) -> u64 {
        self.out_edges(*paper_id).len() as u64
    }

    /// Distinct papers citing `paper_id`, in first-citation order.
    pub fn citing_papers(&self, paper_id: &PaperId) -> Vec<PaperId> {
        distinct(self.in_edges(*paper_id))
    }

    /// Distinct papers cited by `paper_id`, in first-citation order.
    pub fn cited_papers(&self, paper_id: &PaperId) -> Vec<PaperId> {
        distinct(self.out_edges(*paper_id))
    }

    /// Papers listing `author_id` among their authors, in registration order.
    pub fn author_papers(&self, author_id: &AuthorId) -> Vec<PaperId> {
        self.papers()
            .filter(|paper| paper.has_author(author_id))
            .map(|paper| paper.id)
            .collect()
    }

    /// Sum of `citation_count` over every paper by `author_id`.
    pub fn author_citation_count(&self, author_id: &AuthorId) -> u64 {
        self.author_papers(author_id)
            .iter()
            .map(|paper_id| self.citation_count(paper_id))
            .sum()
    }

    /// PageRank of every paper under `config`.
    ///
    /// The vector is cached until the next `add_paper`/`add_citation`, or
    /// until it is requested with a different config.
    pub fn authority_scores(&self, config: &PageRankConfig) -> Arc<HashMap<PaperId, f64>> {
        let mut cache = self.rank_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if cached.config == *config {
                return Arc::clone(&cached.scores);
            }
        }

        let scores = Arc::new(compute_pagerank(self, config));
        *cache = Some(RankCache {
            config: config.clone(),
            scores: Arc::clone(&scores),
        });
        scores
    }

    /// Sum of paper PageRank over the author's papers. Zero without papers.
    pub fn author_authority_score(&self, author_id: &AuthorId, config: &PageRankConfig) -> f64 {
        let papers = self.author_papers(author_id);
        if papers.is_empty() {
            return 0.0;
        }
        let scores = self.authority_scores(config);
        papers
            .iter()
            .map(|paper_id| scores.get(paper_id).copied().unwrap_or(0.0))
            .sum()
    }

    /// Highest-ranked papers, best first.
    pub fn top_papers(&self, config: &PageRankConfig, limit: usize) -> Vec<ScoredPaper> {
        let scores = self.authority_scores(config);
        rank_papers(self, &scores, limit)
    }

    /// Papers reachable from `paper_id` within `depth` hops.
    pub fn lineage(&self, paper_id: &PaperId, depth: usize, direction: Direction) -> Vec<LineageEntry> {
        trace_lineage(self, *paper_id, depth, direction)
    }

    /// Structural summary of the graph.
    pub fn network_stats(&self) -> NetworkStats {
        compute_network_stats(self)
    }

    fn invalidate_ranks(&mut self) {
        *self.rank_cache.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[cfg(test)]
    fn has_cached_ranks(&self) -> bool {
        self.rank_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for CitationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationCounter for CitationGraph {
    fn author_citation_count(&self, author_id: &AuthorId) -> u64 {
        CitationGraph::author_citation_count(self, author_id)
    }
}

fn distinct<T: Copy + Eq + Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn author(n: u128) -> AuthorId {
        Uuid::from_u128(1000 + n)
    }

    fn paper(n: u128, authors: &[AuthorId]) -> Paper {
        Paper {
            id: Uuid::from_u128(n),
            ..Paper::new(format!("Paper {}", n), authors.to_vec())
        }
    }

    fn cite(citing: u128, cited: u128) -> Citation {
        Citation::new(Uuid::from_u128(citing), Uuid::from_u128(cited))
    }

    fn three_paper_graph(policy: DuplicateCitationPolicy) -> CitationGraph {
        let mut graph = CitationGraph::with_policy(policy);
        graph.add_paper(paper(1, &[author(1)])).unwrap();
        graph.add_paper(paper(2, &[author(2)])).unwrap();
        graph.add_paper(paper(3, &[author(1), author(2)])).unwrap();
        graph
    }

    #[test]
    fn duplicate_paper_id_rejected() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        let err = graph.add_paper(paper(1, &[author(9)])).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateId(_)));
        assert_eq!(graph.paper_count(), 3);
    }

    #[test]
    fn paper_without_authors_rejected() {
        let mut graph = CitationGraph::new();
        let err = graph.add_paper(paper(1, &[])).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(graph.paper_count(), 0);
    }

    #[test]
    fn self_citation_rejected_without_edge() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        let err = graph.add_citation(cite(1, 1)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(graph.citation_count(&Uuid::from_u128(1)), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.citation_record_count(), 0);
    }

    #[test]
    fn unknown_endpoint_rejected_without_state_change() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        assert!(matches!(
            graph.add_citation(cite(1, 99)).unwrap_err(),
            LedgerError::NotFound(_)
        ));
        assert!(matches!(
            graph.add_citation(cite(99, 1)).unwrap_err(),
            LedgerError::NotFound(_)
        ));
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.paper(&Uuid::from_u128(1)).unwrap().citations.is_empty());
    }

    #[test]
    fn citation_increments_only_cited_in_degree() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);

        graph.add_citation(cite(1, 2)).unwrap();

        assert_eq!(graph.citation_count(&b), 1);
        assert_eq!(graph.citation_count(&a), 0);
        assert_eq!(graph.citing_papers(&b), vec![a]);
        assert_eq!(graph.cited_papers(&a), vec![b]);
        assert_eq!(graph.paper(&a).unwrap().citations, vec![b]);
    }

    #[test]
    fn unknown_paper_queries_default_to_empty() {
        let graph = CitationGraph::new();
        let ghost = Uuid::from_u128(42);
        assert_eq!(graph.citation_count(&ghost), 0);
        assert!(graph.citing_papers(&ghost).is_empty());
        assert!(graph.cited_papers(&ghost).is_empty());
        assert_eq!(graph.author_citation_count(&author(1)), 0);
    }

    #[test]
    fn count_each_keeps_parallel_edges() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        graph.add_citation(cite(1, 2)).unwrap();
        graph.add_citation(cite(1, 2)).unwrap();

        let b = Uuid::from_u128(2);
        assert_eq!(graph.citation_count(&b), 2);
        assert_eq!(graph.citation_record_count(), 2);
        assert_eq!(graph.citing_papers(&b).len(), 1);
        // The citing paper's reference list is not duplicated.
        assert_eq!(graph.paper(&Uuid::from_u128(1)).unwrap().citations, vec![b]);
    }

    #[test]
    fn default_policy_counts_repeated_pair_once() {
        let mut graph = CitationGraph::new();
        assert_eq!(graph.policy(), DuplicateCitationPolicy::CountOnce);
        graph.add_paper(paper(1, &[author(1)])).unwrap();
        graph.add_paper(paper(2, &[author(2)])).unwrap();
        graph.add_citation(cite(2, 1)).unwrap();
        graph.add_citation(cite(2, 1)).unwrap();

        let stats = graph.network_stats();
        assert_eq!(graph.citation_count(&Uuid::from_u128(1)), 1);
        assert_eq!(graph.author_citation_count(&author(1)), 1);
        assert_eq!(stats.total_citations, 2);
        assert!((stats.density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn repeated_authors_collapse_to_a_set() {
        let mut graph = CitationGraph::new();
        graph
            .add_paper(paper(1, &[author(1), author(2), author(1)]))
            .unwrap();
        let stored = graph.paper(&Uuid::from_u128(1)).unwrap();
        assert_eq!(stored.authors, vec![author(1), author(2)]);
        assert_eq!(graph.author_papers(&author(1)), vec![Uuid::from_u128(1)]);
    }

    #[test]
    fn linked_pairs_ignore_parallel_edges() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        graph.add_citation(cite(1, 2)).unwrap();
        graph.add_citation(cite(1, 2)).unwrap();
        graph.add_citation(cite(2, 1)).unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.linked_pair_count(), 2);
    }

    #[test]
    fn count_once_keeps_record_but_single_edge() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountOnce);
        graph.add_citation(cite(1, 2)).unwrap();
        graph.add_citation(cite(1, 2)).unwrap();

        assert_eq!(graph.citation_count(&Uuid::from_u128(2)), 1);
        assert_eq!(graph.citation_record_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn reject_policy_refuses_second_citation() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::Reject);
        graph.add_citation(cite(1, 2)).unwrap();
        let err = graph.add_citation(cite(1, 2)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(graph.citation_record_count(), 1);
        // The reverse direction is a different pair.
        assert!(graph.add_citation(cite(2, 1)).is_ok());
    }

    #[test]
    fn reused_citation_id_rejected() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        let first = cite(1, 2);
        let replay = Citation {
            cited_paper_id: Uuid::from_u128(3),
            ..first.clone()
        };
        graph.add_citation(first).unwrap();
        assert!(matches!(
            graph.add_citation(replay).unwrap_err(),
            LedgerError::DuplicateId(_)
        ));
    }

    #[test]
    fn author_queries_aggregate_over_papers() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        // author(1) wrote papers 1 and 3; author(2) wrote 2 and 3.
        graph.add_citation(cite(2, 1)).unwrap();
        graph.add_citation(cite(2, 3)).unwrap();
        graph.add_citation(cite(1, 3)).unwrap();

        assert_eq!(
            graph.author_papers(&author(1)),
            vec![Uuid::from_u128(1), Uuid::from_u128(3)]
        );
        assert_eq!(graph.author_citation_count(&author(1)), 3);
        assert_eq!(graph.author_citation_count(&author(2)), 2);
        assert_eq!(graph.author_citation_count(&author(7)), 0);
    }

    #[test]
    fn author_authority_score_sums_paper_ranks() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        graph.add_citation(cite(2, 1)).unwrap();
        let config = PageRankConfig::default();
        let scores = graph.authority_scores(&config);

        let expected = scores[&Uuid::from_u128(1)] + scores[&Uuid::from_u128(3)];
        let actual = graph.author_authority_score(&author(1), &config);
        assert!((actual - expected).abs() < 1e-12);
        assert_eq!(graph.author_authority_score(&author(99), &config), 0.0);
    }

    #[test]
    fn rank_cache_invalidated_by_mutation() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        let config = PageRankConfig::default();

        let before = graph.authority_scores(&config);
        assert!(graph.has_cached_ranks());
        let again = graph.authority_scores(&config);
        assert!(Arc::ptr_eq(&before, &again));

        graph.add_citation(cite(1, 2)).unwrap();
        assert!(!graph.has_cached_ranks());
        let after = graph.authority_scores(&config);
        assert!(after[&Uuid::from_u128(2)] > before[&Uuid::from_u128(2)]);
    }

    #[test]
    fn rank_cache_keyed_by_config() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        graph.add_citation(cite(1, 2)).unwrap();

        let default_scores = graph.authority_scores(&PageRankConfig::default());
        let low_damping = PageRankConfig {
            damping_factor: 0.5,
            ..PageRankConfig::default()
        };
        let other = graph.authority_scores(&low_damping);
        assert!(!Arc::ptr_eq(&default_scores, &other));
        assert!(
            (default_scores[&Uuid::from_u128(2)] - other[&Uuid::from_u128(2)]).abs() > 1e-6
        );
    }

    #[test]
    fn papers_and_citations_iterate_in_insertion_order() {
        let mut graph = three_paper_graph(DuplicateCitationPolicy::CountEach);
        let first = cite(3, 1);
        let second = cite(1, 2);
        let (first_id, second_id) = (first.id, second.id);
        graph.add_citation(first).unwrap();
        graph.add_citation(second).unwrap();

        let ids: Vec<PaperId> = graph.papers().map(|p| p.id).collect();
        assert_eq!(ids, graph.paper_ids().to_vec());
        let citation_ids: Vec<CitationId> = graph.citations().map(|c| c.id).collect();
        assert_eq!(citation_ids, vec![first_id, second_id]);
    }
}
