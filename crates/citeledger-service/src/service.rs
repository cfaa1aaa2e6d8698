// crates/citeledger-service/src/service.rs
//
// CitationService: authenticated composite operations over the citation graph
// and the token emission engine, plus read-only queries.
//
// Every mutation verifies the caller's credentials against the AuthSystem
// before touching any component. Queries are unauthenticated and take read
// locks only.

use serde::{Deserialize, Serialize};

use citeledger_core::{
    Author, AuthorId, AuthSystem, Citation, CitationId, Credentials, KeyRegistry, LedgerError,
    Paper, PaperId, TokenTransaction,
};
use citeledger_economics::TokenStats;
use citeledger_graph::{Direction, LineageEntry, NetworkStats, PageRankConfig, ScoredPaper};

use crate::config::ServiceConfig;
use crate::shared::LedgerSharedState;

/// Result of minting for one author of a cited paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MintStatus {
    Minted { amount: f64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintOutcome {
    pub author_id: AuthorId,
    #[serde(flatten)]
    pub status: MintStatus,
}

impl MintOutcome {
    /// Tokens minted, or 0.0 if this author's mint failed.
    pub fn amount(&self) -> f64 {
        match self.status {
            MintStatus::Minted { amount } => amount,
            MintStatus::Failed { .. } => 0.0,
        }
    }
}

/// A recorded citation and the per-author mint results it triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationReceipt {
    pub citation: Citation,
    pub mints: Vec<MintOutcome>,
}

impl CitationReceipt {
    pub fn total_minted(&self) -> f64 {
        self.mints.iter().map(MintOutcome::amount).sum()
    }

    pub fn all_minted(&self) -> bool {
        self.mints
            .iter()
            .all(|m| matches!(m.status, MintStatus::Minted { .. }))
    }
}

/// The citation ledger service.
pub struct CitationService<A: AuthSystem = KeyRegistry> {
    state: LedgerSharedState<A>,
    pagerank: PageRankConfig,
}

impl CitationService<KeyRegistry> {
    /// Service backed by an empty ed25519 key registry.
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_auth(config, KeyRegistry::new())
    }
}

impl<A: AuthSystem> Clone for CitationService<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            pagerank: self.pagerank.clone(),
        }
    }
}

impl<A: AuthSystem> CitationService<A> {
    pub fn with_auth(config: &ServiceConfig, auth: A) -> Self {
        Self {
            state: LedgerSharedState::new(config, auth),
            pagerank: config.pagerank.clone(),
        }
    }

    pub fn shared_state(&self) -> &LedgerSharedState<A> {
        &self.state
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthorId, LedgerError> {
        let auth = self.state.auth.read().await;
        auth.verify_author(
            &credentials.public_key,
            credentials.message.as_bytes(),
            &credentials.signature,
        )
        .map_err(|e| {
            tracing::warn!("Rejected credentials: {}", e);
            e
        })
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Register a new author bound to the key in `credentials`.
    ///
    /// The credentials must be signed by that same key, proving possession.
    /// `opening_balance` is ledgered as a MINT when non-zero.
    pub async fn register_author(
        &self,
        name: &str,
        opening_balance: f64,
        credentials: &Credentials,
    ) -> Result<Author, LedgerError> {
        let signature_valid = citeledger_core::crypto::verify_signature(
            &credentials.public_key,
            credentials.message.as_bytes(),
            &credentials.signature,
        )
        .unwrap_or(false);
        if !signature_valid {
            tracing::warn!("Rejected author registration for {}: bad signature", name);
            return Err(LedgerError::Unauthenticated(
                "registration must be signed by the key being registered".to_string(),
            ));
        }

        // Must fail before the key is bound.
        if !opening_balance.is_finite() || opening_balance < 0.0 {
            return Err(LedgerError::Validation(format!(
                "opening balance must be a non-negative number, got {}",
                opening_balance
            )));
        }

        let author = Author::new(name, credentials.public_key.to_ascii_lowercase())
            .with_balance(opening_balance);

        let mut engine = self.state.engine.write().await;
        let mut auth = self.state.auth.write().await;
        auth.register_key(author.id, &credentials.public_key)?;
        engine.register_author(author.clone())?;
        Ok(author)
    }

    /// Submit a paper. The caller must be one of its authors, and every
    /// listed author must be registered. Repeated author ids are collapsed;
    /// the returned paper is the stored record.
    pub async fn submit_paper(
        &self,
        title: &str,
        authors: Vec<AuthorId>,
        credentials: &Credentials,
    ) -> Result<Paper, LedgerError> {
        let caller = self.authenticate(credentials).await?;
        if !authors.contains(&caller) {
            tracing::warn!("Author {} tried to submit a paper they did not write", caller);
            return Err(LedgerError::Forbidden(format!(
                "author {} is not listed on \"{}\"",
                caller, title
            )));
        }

        let mut graph = self.state.graph.write().await;
        {
            let engine = self.state.engine.read().await;
            if let Some(missing) = authors.iter().find(|id| engine.author(id).is_none()) {
                return Err(LedgerError::NotFound(format!("author {}", missing)));
            }
        }

        let paper = Paper::new(title, authors);
        let paper_id = paper.id;
        graph.add_paper(paper)?;
        graph
            .paper(&paper_id)
            .cloned()
            .ok_or_else(|| {
                LedgerError::InvalidState(format!("paper {} vanished after insert", paper_id))
            })
    }

    /// Record `citing -> cited`, then mint for every author of the cited paper.
    ///
    /// The caller must author the citing paper. The graph write lock is held
    /// while recording and downgraded before minting, so each mint observes
    /// the post-citation count and no other citation interleaves. Mint
    /// failures are reported per author in the receipt.
    pub async fn submit_citation(
        &self,
        citing: PaperId,
        cited: PaperId,
        credentials: &Credentials,
    ) -> Result<CitationReceipt, LedgerError> {
        let caller = self.authenticate(credentials).await?;

        let mut graph = self.state.graph.write().await;
        let citing_paper = graph
            .paper(&citing)
            .ok_or_else(|| LedgerError::NotFound(format!("paper {}", citing)))?;
        if !citing_paper.has_author(&caller) {
            tracing::warn!("Author {} tried to cite from paper {} they did not write", caller, citing);
            return Err(LedgerError::Forbidden(format!(
                "author {} is not an author of paper {}",
                caller, citing
            )));
        }

        let citation = Citation::new(citing, cited);
        if let Err(e) = graph.add_citation(citation.clone()) {
            tracing::warn!("Rejected citation {} -> {}: {}", citing, cited, e);
            return Err(e);
        }

        let graph = graph.downgrade();
        let cited_authors = graph
            .paper(&cited)
            .map(|paper| paper.authors.clone())
            .unwrap_or_default();

        let mut engine = self.state.engine.write().await;
        let mints = cited_authors
            .into_iter()
            .map(|author_id| {
                let status = match engine.mint_for_citation_event(&*graph, &author_id, citation.id)
                {
                    Ok(amount) => MintStatus::Minted { amount },
                    Err(e) => {
                        tracing::warn!("Mint for author {} failed: {}", author_id, e);
                        MintStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                MintOutcome { author_id, status }
            })
            .collect();

        Ok(CitationReceipt { citation, mints })
    }

    /// Burn tokens from the authenticated caller's balance.
    pub async fn burn(
        &self,
        amount: f64,
        reason: &str,
        credentials: &Credentials,
    ) -> Result<TokenTransaction, LedgerError> {
        let caller = self.authenticate(credentials).await?;
        let mut engine = self.state.engine.write().await;
        engine.burn(&caller, amount, reason).map_err(|e| {
            tracing::warn!("Rejected burn of {} by {}: {}", amount, caller, e);
            e
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn balance_of(&self, author_id: &AuthorId) -> f64 {
        self.state.engine.read().await.balance_of(author_id)
    }

    pub async fn transaction_history(&self, author_id: &AuthorId) -> Vec<TokenTransaction> {
        self.state.engine.read().await.transaction_history(author_id)
    }

    pub async fn token_stats(&self) -> TokenStats {
        self.state.engine.read().await.token_stats()
    }

    pub async fn author(&self, author_id: &AuthorId) -> Option<Author> {
        self.state.engine.read().await.author(author_id).cloned()
    }

    pub async fn authors(&self) -> Vec<Author> {
        self.state.engine.read().await.authors().cloned().collect()
    }

    /// Re-derive balances from the ledger and check conservation.
    pub async fn verify_ledger(&self) -> Result<(), LedgerError> {
        self.state.engine.read().await.verify_ledger()
    }

    pub async fn network_stats(&self) -> NetworkStats {
        self.state.graph.read().await.network_stats()
    }

    pub async fn paper(&self, paper_id: &PaperId) -> Option<Paper> {
        self.state.graph.read().await.paper(paper_id).cloned()
    }

    pub async fn papers(&self) -> Vec<Paper> {
        self.state.graph.read().await.papers().cloned().collect()
    }

    pub async fn citation(&self, citation_id: &CitationId) -> Option<Citation> {
        self.state.graph.read().await.citation(citation_id).cloned()
    }

    pub async fn citations(&self) -> Vec<Citation> {
        self.state.graph.read().await.citations().cloned().collect()
    }

    pub async fn citation_count(&self, paper_id: &PaperId) -> u64 {
        self.state.graph.read().await.citation_count(paper_id)
    }

    pub async fn citing_papers(&self, paper_id: &PaperId) -> Vec<PaperId> {
        self.state.graph.read().await.citing_papers(paper_id)
    }

    pub async fn cited_papers(&self, paper_id: &PaperId) -> Vec<PaperId> {
        self.state.graph.read().await.cited_papers(paper_id)
    }

    pub async fn author_papers(&self, author_id: &AuthorId) -> Vec<PaperId> {
        self.state.graph.read().await.author_papers(author_id)
    }

    pub async fn author_citation_count(&self, author_id: &AuthorId) -> u64 {
        self.state.graph.read().await.author_citation_count(author_id)
    }

    pub async fn author_authority_score(&self, author_id: &AuthorId) -> f64 {
        self.state
            .graph
            .read()
            .await
            .author_authority_score(author_id, &self.pagerank)
    }

    pub async fn top_papers(&self, limit: usize) -> Vec<ScoredPaper> {
        self.state.graph.read().await.top_papers(&self.pagerank, limit)
    }

    pub async fn lineage(
        &self,
        paper_id: &PaperId,
        depth: usize,
        direction: Direction,
    ) -> Vec<LineageEntry> {
        self.state.graph.read().await.lineage(paper_id, depth, direction)
    }
}
