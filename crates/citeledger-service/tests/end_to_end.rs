// crates/citeledger-service/tests/end_to_end.rs
//
// End-to-end flows through CitationService: registration, paper submission,
// citation with reward minting, burns, and the authentication guards.

use citeledger_core::{Author, Keypair, LedgerError, TransactionKind};
use citeledger_graph::{Direction, DuplicateCitationPolicy};
use citeledger_service::{CitationService, MintStatus, ServiceConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TOLERANCE: f64 = 1e-6;

/// Single-citation reward under the default curve: ln(1.1).
fn one_citation_reward() -> f64 {
    1.1_f64.ln()
}

async fn register(service: &CitationService, name: &str) -> (Keypair, Author) {
    let keys = Keypair::generate();
    let author = service
        .register_author(name, 0.0, &keys.credentials(format!("register {}", name)))
        .await
        .expect("registration should succeed");
    (keys, author)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_citation_rewards_and_burn_scenario() {
    let service = CitationService::new(&ServiceConfig::default());
    let (k1, a1) = register(&service, "A1").await;
    let (k2, a2) = register(&service, "A2").await;

    let p1 = service
        .submit_paper("P1", vec![a1.id], &k1.credentials("submit P1"))
        .await
        .unwrap();
    let p2 = service
        .submit_paper("P2", vec![a2.id], &k2.credentials("submit P2"))
        .await
        .unwrap();

    // P2 -> P1 rewards A1.
    let receipt = service
        .submit_citation(p2.id, p1.id, &k2.credentials("cite P1"))
        .await
        .unwrap();
    assert_eq!(service.citation_count(&p1.id).await, 1);
    assert_eq!(receipt.mints.len(), 1);
    assert_eq!(receipt.mints[0].author_id, a1.id);
    assert!((service.balance_of(&a1.id).await - one_citation_reward()).abs() < TOLERANCE);
    assert!((service.balance_of(&a1.id).await - 0.09531).abs() < 1e-5);

    // P3 (A1) -> P2 rewards A2.
    let p3 = service
        .submit_paper("P3", vec![a1.id], &k1.credentials("submit P3"))
        .await
        .unwrap();
    let receipt = service
        .submit_citation(p3.id, p2.id, &k1.credentials("cite P2"))
        .await
        .unwrap();
    assert_eq!(service.citation_count(&p2.id).await, 1);
    assert!(matches!(receipt.mints[0].status, MintStatus::Minted { .. }));
    assert!((service.balance_of(&a2.id).await - one_citation_reward()).abs() < TOLERANCE);

    // Burn 0.05 from A1.
    let burn = service
        .burn(0.05, "Review fee", &k1.credentials("burn"))
        .await
        .unwrap();
    assert_eq!(burn.kind, TransactionKind::Burn);
    let remaining = service.balance_of(&a1.id).await;
    assert!((remaining - (one_citation_reward() - 0.05)).abs() < TOLERANCE);
    assert!((remaining - 0.04531).abs() < 1e-5);

    let history = service.transaction_history(&a1.id).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, TransactionKind::Mint);
    assert_eq!(history[1].kind, TransactionKind::Burn);

    let stats = service.token_stats().await;
    assert_eq!(stats.total_authors, 2);
    assert_eq!(stats.total_transactions, 3);
    assert!((stats.total_supply - (2.0 * one_citation_reward() - 0.05)).abs() < TOLERANCE);

    let network = service.network_stats().await;
    assert_eq!(network.total_papers, 3);
    assert_eq!(network.total_citations, 2);
    assert!(network.is_dag);

    service.verify_ledger().await.unwrap();
}

#[tokio::test]
async fn test_over_burn_leaves_balance_unchanged() {
    let service = CitationService::new(&ServiceConfig::default());
    let (keys, author) = register(&service, "Ada").await;

    let err = service
        .burn(1.0, "too much", &keys.credentials("burn"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert_eq!(service.balance_of(&author.id).await, 0.0);
    assert!(service.transaction_history(&author.id).await.is_empty());
    service.verify_ledger().await.unwrap();
}

#[tokio::test]
async fn test_unauthenticated_requests_are_refused() {
    let service = CitationService::new(&ServiceConfig::default());
    let (keys, author) = register(&service, "Ada").await;
    let stranger = Keypair::generate();

    // Unregistered key.
    let err = service
        .submit_paper("Notes", vec![author.id], &stranger.credentials("submit"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthenticated(_)));

    // Registered key, tampered message.
    let mut tampered = keys.credentials("burn 0");
    tampered.message = "burn 1000".to_string();
    let err = service.burn(0.0, "x", &tampered).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthenticated(_)));

    assert!(service.papers().await.is_empty());
    assert!(service.transaction_history(&author.id).await.is_empty());
}

#[tokio::test]
async fn test_non_authors_are_forbidden() {
    let service = CitationService::new(&ServiceConfig::default());
    let (k1, a1) = register(&service, "A1").await;
    let (k2, a2) = register(&service, "A2").await;

    // Submitting a paper on someone else's behalf.
    let err = service
        .submit_paper("Not mine", vec![a1.id], &k2.credentials("submit"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));

    let p1 = service
        .submit_paper("P1", vec![a1.id], &k1.credentials("submit P1"))
        .await
        .unwrap();
    let p2 = service
        .submit_paper("P2", vec![a2.id], &k2.credentials("submit P2"))
        .await
        .unwrap();

    // Citing from a paper the caller did not write.
    let err = service
        .submit_citation(p2.id, p1.id, &k1.credentials("cite"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));
    assert_eq!(service.citation_count(&p1.id).await, 0);
    assert_eq!(service.balance_of(&a1.id).await, 0.0);
}

#[tokio::test]
async fn test_unknown_cited_paper_is_not_found() {
    let service = CitationService::new(&ServiceConfig::default());
    let (keys, author) = register(&service, "Ada").await;
    let paper = service
        .submit_paper("P", vec![author.id], &keys.credentials("submit"))
        .await
        .unwrap();

    let err = service
        .submit_citation(paper.id, uuid::Uuid::now_v7(), &keys.credentials("cite"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
    assert!(service.citations().await.is_empty());
}

#[tokio::test]
async fn test_reject_policy_refuses_repeat_citation() {
    let config = ServiceConfig {
        duplicate_citations: DuplicateCitationPolicy::Reject,
        ..ServiceConfig::default()
    };
    let service = CitationService::new(&config);
    let (k1, a1) = register(&service, "A1").await;
    let (k2, a2) = register(&service, "A2").await;
    let p1 = service
        .submit_paper("P1", vec![a1.id], &k1.credentials("p1"))
        .await
        .unwrap();
    let p2 = service
        .submit_paper("P2", vec![a2.id], &k2.credentials("p2"))
        .await
        .unwrap();

    service
        .submit_citation(p2.id, p1.id, &k2.credentials("cite"))
        .await
        .unwrap();
    let err = service
        .submit_citation(p2.id, p1.id, &k2.credentials("cite again"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(service.citation_count(&p1.id).await, 1);
    assert!((service.balance_of(&a1.id).await - one_citation_reward()).abs() < TOLERANCE);
}

#[tokio::test]
async fn test_authority_and_lineage_queries() {
    let service = CitationService::new(&ServiceConfig::default());
    let (k1, a1) = register(&service, "A1").await;
    let (k2, a2) = register(&service, "A2").await;

    let base = service
        .submit_paper("Base", vec![a1.id], &k1.credentials("base"))
        .await
        .unwrap();
    let mid = service
        .submit_paper("Mid", vec![a2.id], &k2.credentials("mid"))
        .await
        .unwrap();
    let top = service
        .submit_paper("Top", vec![a2.id], &k2.credentials("top"))
        .await
        .unwrap();
    service
        .submit_citation(mid.id, base.id, &k2.credentials("c1"))
        .await
        .unwrap();
    service
        .submit_citation(top.id, mid.id, &k2.credentials("c2"))
        .await
        .unwrap();
    service
        .submit_citation(top.id, base.id, &k2.credentials("c3"))
        .await
        .unwrap();

    let ranked = service.top_papers(3).await;
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].paper_id, base.id);
    let total: f64 = ranked.iter().map(|p| p.authority_score).sum();
    assert!((total - 1.0).abs() < TOLERANCE);

    let a1_score = service.author_authority_score(&a1.id).await;
    let a2_score = service.author_authority_score(&a2.id).await;
    assert!((a1_score - ranked[0].authority_score).abs() < TOLERANCE);
    assert!((a1_score + a2_score - 1.0).abs() < TOLERANCE);
    assert_eq!(service.author_citation_count(&a1.id).await, 2);
    assert_eq!(service.author_papers(&a2.id).await, vec![mid.id, top.id]);
    assert_eq!(service.citing_papers(&base.id).await, vec![mid.id, top.id]);
    assert_eq!(service.cited_papers(&top.id).await, vec![mid.id, base.id]);

    let lineage = service.lineage(&top.id, 1, Direction::Forward).await;
    assert_eq!(lineage.len(), 2);
    assert!(lineage.iter().all(|entry| entry.depth == 1));
}

#[tokio::test]
async fn test_repeated_citation_counts_once_by_default() {
    let service = CitationService::new(&ServiceConfig::default());
    let (kx, ax) = register(&service, "AX").await;
    let (ky, ay) = register(&service, "AY").await;
    let x = service
        .submit_paper("X", vec![ax.id], &kx.credentials("x"))
        .await
        .unwrap();
    let y = service
        .submit_paper("Y", vec![ay.id], &ky.credentials("y"))
        .await
        .unwrap();

    for message in ["cite", "cite again"] {
        service
            .submit_citation(y.id, x.id, &ky.credentials(message))
            .await
            .unwrap();
    }

    assert_eq!(service.citation_count(&x.id).await, 1);
    assert_eq!(service.citing_papers(&x.id).await, vec![y.id]);
    let network = service.network_stats().await;
    assert_eq!(network.total_citations, 2);
    assert!((network.density - 0.5).abs() < TOLERANCE);

    // Each event still mints, at the unchanged count of one.
    assert!((service.balance_of(&ax.id).await - 2.0 * one_citation_reward()).abs() < TOLERANCE);
    service.verify_ledger().await.unwrap();
}
