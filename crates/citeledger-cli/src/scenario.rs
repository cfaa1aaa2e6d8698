// crates/citeledger-cli/src/scenario.rs
//
// Scenario files for `citeledger replay`: authors, papers, and an ordered
// list of citation and burn events, all referring to each other by alias.

use std::collections::HashSet;
use std::fs;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Could not read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Alias defined twice: {0}")]
    DuplicateAlias(String),

    #[error("Unknown alias: {0}")]
    UnknownAlias(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAuthor {
    pub alias: String,
    pub name: String,
    #[serde(default)]
    pub opening_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPaper {
    pub alias: String,
    pub title: String,
    /// Author aliases.
    pub authors: Vec<String>,
    /// Alias of the author who signs the submission.
    pub submitted_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    Cite {
        citing: String,
        cited: String,
        /// Alias of the author who signs the citation.
        by: String,
    },
    Burn {
        author: String,
        amount: f64,
        #[serde(default)]
        reason: String,
    },
}

impl ScenarioEvent {
    /// Short human-readable label for reports and logs.
    pub fn describe(&self) -> String {
        match self {
            ScenarioEvent::Cite { citing, cited, by } => {
                format!("cite {} -> {} (by {})", citing, cited, by)
            }
            ScenarioEvent::Burn { author, amount, .. } => format!("burn {} from {}", amount, author),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub authors: Vec<ScenarioAuthor>,
    #[serde(default)]
    pub papers: Vec<ScenarioPaper>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

impl Scenario {
    pub fn load(path: &str) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(contents)?;
        scenario.check_aliases()?;
        Ok(scenario)
    }

    /// Aliases must be unique per kind, and every reference must resolve.
    ///
    /// Events may still fail at replay time (self-citation, over-burn); those
    /// are ledger rejections, not malformed input.
    pub fn check_aliases(&self) -> Result<(), ScenarioError> {
        let mut authors = HashSet::new();
        for author in &self.authors {
            if !authors.insert(author.alias.as_str()) {
                return Err(ScenarioError::DuplicateAlias(author.alias.clone()));
            }
        }
        let known_author = |alias: &str| {
            if authors.contains(alias) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownAlias(alias.to_string()))
            }
        };

        let mut papers = HashSet::new();
        for paper in &self.papers {
            if !papers.insert(paper.alias.as_str()) {
                return Err(ScenarioError::DuplicateAlias(paper.alias.clone()));
            }
            known_author(&paper.submitted_by)?;
            for alias in &paper.authors {
                known_author(alias)?;
            }
        }
        let known_paper = |alias: &str| {
            if papers.contains(alias) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownAlias(alias.to_string()))
            }
        };

        for event in &self.events {
            match event {
                ScenarioEvent::Cite { citing, cited, by } => {
                    known_paper(citing)?;
                    known_paper(cited)?;
                    known_author(by)?;
                }
                ScenarioEvent::Burn { author, .. } => known_author(author)?,
            }
        }
        Ok(())
    }
}
