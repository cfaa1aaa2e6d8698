// crates/citeledger-cli/src/commands/replay.rs
//
// `citeledger replay --scenario <file>`: drive a CitationService through a
// scenario file and print the resulting ledger state.
//
// Every author gets a fresh key pair and every request is signed, so the
// replay exercises the same authentication path as any other caller.

use std::collections::HashMap;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use citeledger_core::{AuthorId, Keypair, LedgerError, PaperId};
use citeledger_economics::TokenStats;
use citeledger_graph::NetworkStats;
use citeledger_service::{CitationService, ServiceConfig};

use crate::output::{format_amount, format_json, format_table, OutputFormat};
use crate::scenario::{Scenario, ScenarioEvent};

#[derive(Debug, Args)]
pub struct ReplayCmd {
    /// Path to the scenario JSON file.
    #[arg(long)]
    pub scenario: String,

    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Final balance and standing of one scenario author.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AuthorSummary {
    #[tabled(rename = "Alias")]
    pub alias: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Balance", display_with = "display_amount")]
    pub balance: f64,
    #[tabled(rename = "Citations")]
    pub citations: u64,
    #[tabled(rename = "Authority", display_with = "display_amount")]
    pub authority: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PaperSummary {
    #[tabled(rename = "Alias")]
    pub alias: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Cited by")]
    pub citations: u64,
    #[tabled(rename = "Authority", display_with = "display_amount")]
    pub authority: f64,
}

/// A scenario step the service refused.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct FailedStep {
    #[tabled(rename = "Step")]
    pub step: String,
    #[tabled(rename = "Error")]
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub authors: Vec<AuthorSummary>,
    pub papers: Vec<PaperSummary>,
    pub network: NetworkStats,
    pub tokens: TokenStats,
    pub failures: Vec<FailedStep>,
    /// Outcome of the end-of-replay ledger check.
    pub ledger_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_error: Option<String>,
}

fn display_amount(value: &f64) -> String {
    format_amount(*value)
}

/// Run the replay command.
pub async fn run(cmd: &ReplayCmd, config: &ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::load(&cmd.scenario)?;
    tracing::info!(
        "Replaying {} ({} authors, {} papers, {} events)",
        cmd.scenario,
        scenario.authors.len(),
        scenario.papers.len(),
        scenario.events.len()
    );

    let report = replay(&scenario, config).await;

    match cmd.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => print_tables(&report),
    }
    match report.ledger_error {
        Some(e) => Err(format!("ledger verification failed: {}", e).into()),
        None => Ok(()),
    }
}

/// Drive a fresh service through `scenario`.
///
/// Individual rejections are collected into the report, as is the result
/// of verifying the ledger once every step has run.
pub async fn replay(scenario: &Scenario, config: &ServiceConfig) -> ReplayReport {
    let service = CitationService::new(config);
    let mut failures = Vec::new();

    let mut keys: HashMap<&str, Keypair> = HashMap::new();
    let mut author_ids: HashMap<&str, AuthorId> = HashMap::new();
    for author in &scenario.authors {
        let keypair = Keypair::generate();
        let credentials = keypair.credentials(format!("register {}", author.alias));
        match service
            .register_author(&author.name, author.opening_balance, &credentials)
            .await
        {
            Ok(registered) => {
                author_ids.insert(author.alias.as_str(), registered.id);
                keys.insert(author.alias.as_str(), keypair);
            }
            Err(e) => record_failure(&mut failures, format!("register {}", author.alias), e),
        }
    }

    let mut paper_ids: HashMap<&str, PaperId> = HashMap::new();
    for paper in &scenario.papers {
        let step = format!("submit {}", paper.alias);
        let Some(signer) = keys.get(paper.submitted_by.as_str()) else {
            record_missing(&mut failures, step, &paper.submitted_by);
            continue;
        };
        let authors: Option<Vec<AuthorId>> = paper
            .authors
            .iter()
            .map(|alias| author_ids.get(alias.as_str()).copied())
            .collect();
        let Some(authors) = authors else {
            record_missing(&mut failures, step, "co-author");
            continue;
        };

        match service
            .submit_paper(&paper.title, authors, &signer.credentials(step.clone()))
            .await
        {
            Ok(submitted) => {
                paper_ids.insert(paper.alias.as_str(), submitted.id);
            }
            Err(e) => record_failure(&mut failures, step, e),
        }
    }

    for (index, event) in scenario.events.iter().enumerate() {
        let step = format!("#{} {}", index + 1, event.describe());
        match event {
            ScenarioEvent::Cite { citing, cited, by } => {
                let (Some(signer), Some(citing_id), Some(cited_id)) = (
                    keys.get(by.as_str()),
                    paper_ids.get(citing.as_str()),
                    paper_ids.get(cited.as_str()),
                ) else {
                    record_missing(&mut failures, step, "paper or author");
                    continue;
                };
                match service
                    .submit_citation(*citing_id, *cited_id, &signer.credentials(step.clone()))
                    .await
                {
                    Ok(receipt) => {
                        tracing::debug!("{}: minted {:.6}", step, receipt.total_minted());
                        if !receipt.all_minted() {
                            failures.push(FailedStep {
                                step,
                                error: "some co-authors were not rewarded".to_string(),
                            });
                        }
                    }
                    Err(e) => record_failure(&mut failures, step, e),
                }
            }
            ScenarioEvent::Burn {
                author,
                amount,
                reason,
            } => {
                let Some(signer) = keys.get(author.as_str()) else {
                    record_missing(&mut failures, step, author);
                    continue;
                };
                if let Err(e) = service
                    .burn(*amount, reason, &signer.credentials(step.clone()))
                    .await
                {
                    record_failure(&mut failures, step, e);
                }
            }
        }
    }

    let ledger_error = verification_error(service.verify_ledger().await);

    let mut authors = Vec::with_capacity(scenario.authors.len());
    for author in &scenario.authors {
        let Some(id) = author_ids.get(author.alias.as_str()) else {
            continue;
        };
        authors.push(AuthorSummary {
            alias: author.alias.clone(),
            name: author.name.clone(),
            balance: service.balance_of(id).await,
            citations: service.author_citation_count(id).await,
            authority: service.author_authority_score(id).await,
        });
    }

    let ranked = service.top_papers(usize::MAX).await;
    let mut papers = Vec::with_capacity(ranked.len());
    for scored in ranked {
        let alias = scenario
            .papers
            .iter()
            .find(|p| paper_ids.get(p.alias.as_str()) == Some(&scored.paper_id))
            .map(|p| p.alias.clone())
            .unwrap_or_default();
        papers.push(PaperSummary {
            alias,
            title: scored.title,
            citations: scored.citation_count,
            authority: scored.authority_score,
        });
    }

    tracing::info!(
        "Replay finished in {:?} with {} rejected step(s)",
        service.shared_state().uptime(),
        failures.len()
    );

    ReplayReport {
        authors,
        papers,
        network: service.network_stats().await,
        tokens: service.token_stats().await,
        failures,
        ledger_verified: ledger_error.is_none(),
        ledger_error,
    }
}

fn verification_error(result: Result<(), LedgerError>) -> Option<String> {
    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::error!("Ledger verification failed: {}", e);
            Some(e.to_string())
        }
    }
}

fn record_failure(failures: &mut Vec<FailedStep>, step: String, error: LedgerError) {
    tracing::warn!("{} rejected: {}", step, error);
    failures.push(FailedStep {
        step,
        error: error.to_string(),
    });
}

fn record_missing(failures: &mut Vec<FailedStep>, step: String, what: &str) {
    tracing::warn!("{} skipped: {} was never registered", step, what);
    failures.push(FailedStep {
        step,
        error: format!("{} was never registered", what),
    });
}

fn print_tables(report: &ReplayReport) {
    println!("Authors");
    println!("{}", format_table(&report.authors));
    println!();
    println!("Papers");
    println!("{}", format_table(&report.papers));
    println!();

    let network = &report.network;
    println!(
        "Network: {} papers | {} citations | avg {:.3} | max {} | density {:.4} | DAG: {}",
        network.total_papers,
        network.total_citations,
        network.average_citations,
        network.max_citations,
        network.density,
        if network.is_dag { "yes" } else { "no" }
    );
    let tokens = &report.tokens;
    println!(
        "Tokens:  supply {} | {} authors | {} transactions | avg {} | max {}",
        format_amount(tokens.total_supply),
        tokens.total_authors,
        tokens.total_transactions,
        format_amount(tokens.average_balance),
        format_amount(tokens.max_balance)
    );

    match &report.ledger_error {
        None => println!("Ledger:  verified"),
        Some(e) => println!("Ledger:  NOT verified ({})", e),
    }

    if !report.failures.is_empty() {
        println!();
        println!("Rejected steps");
        println!("{}", format_table(&report.failures));
    }
}
