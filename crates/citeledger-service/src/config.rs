// crates/citeledger-service/src/config.rs
//
// Runtime configuration for the CiteLedger service.
// Loaded from a TOML file or populated with sensible defaults.

use serde::{Deserialize, Serialize};
use std::fs;

use citeledger_core::LedgerError;
use citeledger_economics::CitationCurve;
use citeledger_graph::{DuplicateCitationPolicy, PageRankConfig};

/// Runtime configuration for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// PageRank parameters used for authority scores.
    #[serde(default)]
    pub pagerank: PageRankConfig,

    /// Reward curve parameters. Fixed for the lifetime of the engine.
    #[serde(default)]
    pub emission: CitationCurve,

    /// Handling of repeated citations between the same pair of papers.
    #[serde(default)]
    pub duplicate_citations: DuplicateCitationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pagerank: PageRankConfig::default(),
            emission: CitationCurve::default(),
            duplicate_citations: DuplicateCitationPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// parsed values fail validation.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: ServiceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let damping = self.pagerank.damping_factor;
        if !(0.0..=1.0).contains(&damping) {
            return Err(LedgerError::Validation(format!(
                "pagerank.damping_factor must be within [0, 1], got {}",
                damping
            )));
        }
        if !self.pagerank.convergence_threshold.is_finite()
            || self.pagerank.convergence_threshold <= 0.0
        {
            return Err(LedgerError::Validation(format!(
                "pagerank.convergence_threshold must be positive, got {}",
                self.pagerank.convergence_threshold
            )));
        }
        CitationCurve::new(
            self.emission.base_mint_rate,
            self.emission.citation_decay,
            self.emission.max_citations_for_mint,
        )?;
        Ok(())
    }
}
