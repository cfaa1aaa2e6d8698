// crates/citeledger-economics/src/engine.rs
//
// Token emission engine: author balances plus the append-only ledger.
//
// Every balance change is written to the ledger first-class, so for each
// author `balance == sum(MINT) - sum(BURN)` and `total_supply == sum(balances)`
// hold after every call. Failed calls leave the engine untouched.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use citeledger_core::{
    Author, AuthorId, CitationCounter, CitationId, LedgerError, TokenTransaction,
};

use crate::curve::CitationCurve;

/// Absolute tolerance used when re-deriving balances from the ledger.
pub const LEDGER_TOLERANCE: f64 = 1e-9;

/// Aggregate view of the token economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    pub total_supply: f64,
    pub total_authors: usize,
    pub total_transactions: usize,
    /// Mean author balance; 0.0 with no authors.
    pub average_balance: f64,
    /// Largest author balance; 0.0 with no authors.
    pub max_balance: f64,
}

/// Owns author balances and the transaction ledger.
#[derive(Debug, Default)]
pub struct TokenEmissionEngine {
    curve: CitationCurve,
    authors: HashMap<AuthorId, Author>,
    /// Registration order of authors.
    author_order: Vec<AuthorId>,
    transactions: Vec<TokenTransaction>,
    total_supply: f64,
    /// (citation, author) pairs already rewarded through the keyed mint path.
    minted_events: HashSet<(CitationId, AuthorId)>,
}

impl TokenEmissionEngine {
    /// Create an engine with the default reward curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom reward curve.
    pub fn with_curve(curve: CitationCurve) -> Self {
        Self {
            curve,
            ..Self::default()
        }
    }

    pub fn curve(&self) -> &CitationCurve {
        &self.curve
    }

    /// Register an author.
    ///
    /// A non-zero `token_balance` on the incoming record is treated as an
    /// opening balance and written to the ledger as a MINT.
    ///
    /// # Errors
    /// `DuplicateId` if already registered; `Validation` if the opening
    /// balance is negative or not finite.
    pub fn register_author(&mut self, author: Author) -> Result<(), LedgerError> {
        if self.authors.contains_key(&author.id) {
            return Err(LedgerError::DuplicateId(format!("author {}", author.id)));
        }
        let opening = author.token_balance;
        if !opening.is_finite() || opening < 0.0 {
            return Err(LedgerError::Validation(format!(
                "opening balance must be a non-negative number, got {}",
                opening
            )));
        }

        if opening > 0.0 {
            self.transactions
                .push(TokenTransaction::mint(author.id, opening, "Opening balance"));
            self.total_supply += opening;
        }

        tracing::info!("Registered author {} ({})", author.id, author.name);
        self.author_order.push(author.id);
        self.authors.insert(author.id, author);
        Ok(())
    }

    /// Mint the citation reward for `author_id` based on their current total
    /// citation count.
    ///
    /// Returns 0.0 without touching the ledger for unknown authors. Each call
    /// mints again; use `mint_for_citation_event` to guard against replays.
    pub fn mint_for_citation<C>(&mut self, counter: &C, author_id: &AuthorId) -> f64
    where
        C: CitationCounter + ?Sized,
    {
        self.apply_mint(counter, author_id, None).unwrap_or(0.0)
    }

    /// Mint the reward for one specific citation event, at most once per
    /// (citation, author) pair.
    ///
    /// # Errors
    /// `NotFound` for unknown authors; `AlreadyMinted` if this citation has
    /// already rewarded this author.
    pub fn mint_for_citation_event<C>(
        &mut self,
        counter: &C,
        author_id: &AuthorId,
        citation_id: CitationId,
    ) -> Result<f64, LedgerError>
    where
        C: CitationCounter + ?Sized,
    {
        if !self.authors.contains_key(author_id) {
            return Err(LedgerError::NotFound(format!("author {}", author_id)));
        }
        if self.minted_events.contains(&(citation_id, *author_id)) {
            return Err(LedgerError::AlreadyMinted {
                citation_id,
                author_id: *author_id,
            });
        }

        let amount = self
            .apply_mint(counter, author_id, Some(citation_id))
            .ok_or_else(|| LedgerError::NotFound(format!("author {}", author_id)))?;
        self.minted_events.insert((citation_id, *author_id));
        Ok(amount)
    }

    /// Whether the keyed mint path has already rewarded this pair.
    pub fn has_minted_for(&self, citation_id: &CitationId, author_id: &AuthorId) -> bool {
        self.minted_events.contains(&(*citation_id, *author_id))
    }

    /// Burn `amount` tokens from an author's balance.
    ///
    /// Zero-amount burns are accepted and recorded.
    ///
    /// # Errors
    /// `Validation` for negative or non-finite amounts, `NotFound` for unknown
    /// authors, `InsufficientBalance` when `amount` exceeds the balance.
    pub fn burn(
        &mut self,
        author_id: &AuthorId,
        amount: f64,
        reason: &str,
    ) -> Result<TokenTransaction, LedgerError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::Validation(format!(
                "burn amount must be a non-negative number, got {}",
                amount
            )));
        }
        let author = self
            .authors
            .get_mut(author_id)
            .ok_or_else(|| LedgerError::NotFound(format!("author {}", author_id)))?;
        if amount > author.token_balance {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available: author.token_balance,
            });
        }

        author.token_balance -= amount;
        self.total_supply -= amount;

        let transaction = TokenTransaction::burn(*author_id, amount, reason);
        self.transactions.push(transaction.clone());
        tracing::info!("Burned {:.6} from author {}: {}", amount, author_id, reason);
        Ok(transaction)
    }

    /// Current balance. 0.0 for unknown authors.
    pub fn balance_of(&self, author_id: &AuthorId) -> f64 {
        self.authors
            .get(author_id)
            .map(|author| author.token_balance)
            .unwrap_or(0.0)
    }

    pub fn author(&self, author_id: &AuthorId) -> Option<&Author> {
        self.authors.get(author_id)
    }

    /// All authors, in registration order.
    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.author_order.iter().filter_map(|id| self.authors.get(id))
    }

    /// Ledger entries for one author, oldest first.
    pub fn transaction_history(&self, author_id: &AuthorId) -> Vec<TokenTransaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.author_id == *author_id)
            .cloned()
            .collect()
    }

    /// The whole ledger, oldest first.
    pub fn transactions(&self) -> &[TokenTransaction] {
        &self.transactions
    }

    pub fn total_supply(&self) -> f64 {
        self.total_supply
    }

    pub fn token_stats(&self) -> TokenStats {
        let balances: Vec<f64> = self.authors().map(|author| author.token_balance).collect();
        let average_balance = if balances.is_empty() {
            0.0
        } else {
            balances.iter().sum::<f64>() / balances.len() as f64
        };
        let max_balance = balances.iter().copied().fold(0.0_f64, f64::max);

        TokenStats {
            total_supply: self.total_supply,
            total_authors: self.authors.len(),
            total_transactions: self.transactions.len(),
            average_balance,
            max_balance,
        }
    }

    /// Re-derive every balance from the ledger and check conservation.
    ///
    /// # Errors
    /// `InvalidState` describing the first inconsistency found.
    pub fn verify_ledger(&self) -> Result<(), LedgerError> {
        let mut derived: HashMap<AuthorId, f64> = HashMap::with_capacity(self.authors.len());
        for tx in &self.transactions {
            if !self.authors.contains_key(&tx.author_id) {
                return Err(LedgerError::InvalidState(format!(
                    "transaction {} references unknown author {}",
                    tx.id, tx.author_id
                )));
            }
            *derived.entry(tx.author_id).or_insert(0.0) += tx.signed_amount();
        }

        let mut balance_sum = 0.0;
        for author in self.authors() {
            let expected = derived.get(&author.id).copied().unwrap_or(0.0);
            if author.token_balance < 0.0 {
                return Err(LedgerError::InvalidState(format!(
                    "author {} has negative balance {}",
                    author.id, author.token_balance
                )));
            }
            if (author.token_balance - expected).abs() > LEDGER_TOLERANCE {
                return Err(LedgerError::InvalidState(format!(
                    "author {} balance {} disagrees with ledger total {}",
                    author.id, author.token_balance, expected
                )));
            }
            balance_sum += author.token_balance;
        }

        if (self.total_supply - balance_sum).abs() > LEDGER_TOLERANCE {
            return Err(LedgerError::InvalidState(format!(
                "total supply {} disagrees with sum of balances {}",
                self.total_supply, balance_sum
            )));
        }
        Ok(())
    }

    fn apply_mint<C>(
        &mut self,
        counter: &C,
        author_id: &AuthorId,
        citation_id: Option<CitationId>,
    ) -> Option<f64>
    where
        C: CitationCounter + ?Sized,
    {
        let author = self.authors.get_mut(author_id)?;
        let citation_count = counter.author_citation_count(author_id);
        let effective = self.curve.effective_count(citation_count);
        let amount = self.curve.reward(citation_count);

        author.token_balance += amount;
        self.total_supply += amount;

        let mut transaction = TokenTransaction::mint(
            *author_id,
            amount,
            format!("Citation reward for {} citations", effective),
        );
        if let Some(citation_id) = citation_id {
            transaction = transaction.for_citation(citation_id);
        }
        self.transactions.push(transaction);

        tracing::info!(
            "Minted {:.6} to author {} for {} citations",
            amount,
            author_id,
            effective
        );
        Some(amount)
    }
}
