// crates/citeledger-economics/src/curve.rs
//
// Citation reward curve: how many tokens a citation event mints.
//
//   reward(n) = BASE_MINT_RATE * ln(1 + min(n, MAX_CITATIONS_FOR_MINT) * CITATION_DECAY)
//
// The logarithm gives diminishing marginal rewards; the cap makes the curve
// flat past MAX_CITATIONS_FOR_MINT citations.

use serde::{Deserialize, Serialize};

use citeledger_core::LedgerError;

/// Multiplier applied to the logarithmic term.
pub const BASE_MINT_RATE: f64 = 1.0;

/// Scale of each citation inside the logarithm.
pub const CITATION_DECAY: f64 = 0.1;

/// Citation count at which the reward saturates.
pub const MAX_CITATIONS_FOR_MINT: u64 = 100;

/// Parameters of the reward curve. Fixed once an engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationCurve {
    pub base_mint_rate: f64,
    pub citation_decay: f64,
    pub max_citations_for_mint: u64,
}

impl Default for CitationCurve {
    fn default() -> Self {
        Self {
            base_mint_rate: BASE_MINT_RATE,
            citation_decay: CITATION_DECAY,
            max_citations_for_mint: MAX_CITATIONS_FOR_MINT,
        }
    }
}

impl CitationCurve {
    /// Build a curve, rejecting parameters that would break monotonicity.
    ///
    /// # Errors
    /// Returns `LedgerError::Validation` if the rate is negative, the decay is
    /// not strictly positive, or either is not finite.
    pub fn new(
        base_mint_rate: f64,
        citation_decay: f64,
        max_citations_for_mint: u64,
    ) -> Result<Self, LedgerError> {
        if !base_mint_rate.is_finite() || base_mint_rate < 0.0 {
            return Err(LedgerError::Validation(format!(
                "base_mint_rate must be a non-negative number, got {}",
                base_mint_rate
            )));
        }
        if !citation_decay.is_finite() || citation_decay <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "citation_decay must be positive, got {}",
                citation_decay
            )));
        }
        Ok(Self {
            base_mint_rate,
            citation_decay,
            max_citations_for_mint,
        })
    }

    /// Citation count after applying the saturation cap.
    pub fn effective_count(&self, citation_count: u64) -> u64 {
        citation_count.min(self.max_citations_for_mint)
    }

    /// Tokens minted for an author holding `citation_count` citations.
    pub fn reward(&self, citation_count: u64) -> f64 {
        let clamped = self.effective_count(citation_count);
        if clamped == 0 {
            return 0.0;
        }
        self.base_mint_rate * (clamped as f64 * self.citation_decay).ln_1p()
    }

    /// Increase in reward from one more citation.
    pub fn marginal_reward(&self, citation_count: u64) -> f64 {
        self.reward(citation_count.saturating_add(1)) - self.reward(citation_count)
    }
}
