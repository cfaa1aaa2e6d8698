// crates/citeledger-core/src/paper.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::author::AuthorId;

pub type PaperId = Uuid;
pub type CitationId = Uuid;

/// A paper registered in the citation graph.
///
/// Only `citations` changes after creation: the graph appends a cited paper
/// id to it when an outgoing citation is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Unique identifier (UUID v7 for time-ordering).
    pub id: PaperId,
    pub title: String,
    /// Author ids, treated as a set. Must be non-empty to be accepted by the graph.
    pub authors: Vec<AuthorId>,
    /// Ordered, de-duplicated list of paper ids this paper cites.
    pub citations: Vec<PaperId>,
    pub created_at: DateTime<Utc>,
}

impl Paper {
    /// Create a paper with a fresh id and no declared citations.
    pub fn new(title: impl Into<String>, authors: Vec<AuthorId>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            authors,
            citations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether `author_id` is one of this paper's authors.
    pub fn has_author(&self, author_id: &AuthorId) -> bool {
        self.authors.contains(author_id)
    }
}

/// A directed citation edge: `citing_paper_id` cites `cited_paper_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: CitationId,
    pub citing_paper_id: PaperId,
    pub cited_paper_id: PaperId,
    pub created_at: DateTime<Utc>,
}

impl Citation {
    pub fn new(citing_paper_id: PaperId, cited_paper_id: PaperId) -> Self {
        Self {
            id: Uuid::now_v7(),
            citing_paper_id,
            cited_paper_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_self_citation(&self) -> bool {
        self.citing_paper_id == self.cited_paper_id
    }
}
