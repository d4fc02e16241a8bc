//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::{Cursor, Write};

use tally_core::narrative::OpenAICompatibleNarrator;
use tally_core::test_utils::{MockChatServer, StatusCode};
use tally_core::{
    parse_ledger, AnalysisKind, AnalysisReport, AnalyticsConfig, AnalyticsEngine, NarratorClient,
    Transaction,
};

use crate::cli::Commands;
use crate::commands::{self, truncate, Overrides};

/// Four months of salary, rent, groceries and outings, with one
/// oversized restaurant bill in the last month
fn ledger_csv() -> &'static str {
    r#"date,net_amount,description_fake,category_name,parent_name
2024-01-02,2500.00,VIR Salary,Salary,Income
2024-01-03,-800.00,PRLV Rent,Rent,Logement
2024-01-10,-250.00,CB Grocer,Groceries,Alimentation & Restau.
2024-01-15,-60.00,CB Bistro,Restaurant,Loisirs & Sorties
2024-02-02,2500.00,VIR Salary,Salary,Income
2024-02-03,-800.00,PRLV Rent,Rent,Logement
2024-02-10,-275.00,CB Grocer,Groceries,Alimentation & Restau.
2024-02-15,-55.00,CB Bistro,Restaurant,Loisirs & Sorties
2024-03-02,2500.00,VIR Salary,Salary,Income
2024-03-03,-800.00,PRLV Rent,Rent,Logement
2024-03-10,-300.00,CB Grocer,Groceries,Alimentation & Restau.
2024-03-15,-65.00,CB Bistro,Restaurant,Loisirs & Sorties
2024-04-02,2500.00,VIR Salary,Salary,Income
2024-04-03,-800.00,PRLV Rent,Rent,Logement
2024-04-10,-325.00,CB Grocer,Groceries,Alimentation & Restau.
2024-04-15,-240.00,CB Bistro Anniversary,Restaurant,Loisirs & Sorties
"#
}

fn setup() -> (AnalyticsEngine, Vec<Transaction>) {
    let transactions = parse_ledger(ledger_csv().as_bytes()).unwrap();
    let engine = AnalyticsEngine::new(&AnalyticsConfig::default()).unwrap();
    (engine, transactions)
}

fn render(report: &AnalysisReport) -> String {
    let mut out = Vec::new();
    commands::write_report(&mut out, report).unwrap();
    String::from_utf8(out).unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer description", 10), "a longe...");
    // Multi-byte characters are never split
    assert_eq!(truncate("prélèvement mensuel", 8), "prélè...");
}

#[test]
fn test_overrides_for_commands() {
    let overrides = crate::overrides_for(&Commands::Loan {
        rate: Some(0.04),
        years: Some(20),
        max_ratio: None,
    });
    assert_eq!(overrides.annual_rate, Some(0.04));
    assert_eq!(overrides.term_years, Some(20));
    assert_eq!(overrides.max_debt_ratio, None);

    assert_eq!(crate::overrides_for(&Commands::All), Overrides::default());
}

#[test]
fn test_overrides_apply() {
    let mut config = AnalyticsConfig::default();
    Overrides {
        z_threshold: Some(1.5),
        savings_target: Some(50.0),
        ..Overrides::default()
    }
    .apply(&mut config)
    .unwrap();

    assert_eq!(config.anomaly.z_threshold, 1.5);
    assert_eq!(config.savings.monthly_target, 50.0);
    assert_eq!(config.trends.recent_months, 6);
}

#[test]
fn test_overrides_reject_invalid_parameters() {
    let mut config = AnalyticsConfig::default();
    let result = Overrides {
        trend_months: Some(0),
        ..Overrides::default()
    }
    .apply(&mut config);
    assert!(result.is_err());
}

#[test]
fn test_overrides_reject_out_of_range_loan_terms() {
    let loan = |rate, years| {
        crate::overrides_for(&Commands::Loan {
            rate,
            years,
            max_ratio: None,
        })
    };

    let mut config = AnalyticsConfig::default();
    assert!(loan(Some(-12.0), None).apply(&mut config).is_err());

    let mut config = AnalyticsConfig::default();
    assert!(loan(None, Some(400_000_000)).apply(&mut config).is_err());

    let mut config = AnalyticsConfig::default();
    assert!(loan(Some(0.0), Some(30)).apply(&mut config).is_ok());
}

// ========== Loading Tests ==========

#[test]
fn test_load_transactions_missing_file() {
    let result = commands::load_transactions(std::path::Path::new("/nonexistent/ledger.csv"));
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Failed to load ledger"));
}

#[test]
fn test_load_transactions_and_config_from_files() {
    let mut ledger = tempfile::NamedTempFile::new().unwrap();
    ledger.write_all(ledger_csv().as_bytes()).unwrap();
    let transactions = commands::load_transactions(ledger.path()).unwrap();
    assert_eq!(transactions.len(), 16);

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(config_file, "[loan]\nterm_years = 15").unwrap();
    let config = commands::load_config(Some(config_file.path())).unwrap();
    assert_eq!(config.loan.term_years, 15);
    assert_eq!(config.loan.annual_rate, 0.03);
}

#[test]
fn test_load_config_rejects_bad_toml() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(config_file, "[anomaly\nz_threshold = ").unwrap();
    assert!(commands::load_config(Some(config_file.path())).is_err());
}

// ========== Report Rendering Tests ==========

#[test]
fn test_render_every_report() {
    let (engine, transactions) = setup();

    for report in engine.run_all(&transactions) {
        let text = render(&report);
        assert!(
            text.contains(report.kind().label()),
            "missing heading for {}",
            report.kind()
        );
    }
}

#[test]
fn test_render_categories_table() {
    let (engine, transactions) = setup();
    let report = engine.run(AnalysisKind::Categories, &transactions).unwrap();
    let text = render(&report);

    assert!(text.contains("Logement"));
    assert!(text.contains("Alimentation & Restau."));
    assert!(text.contains("25.00%"));
}

#[test]
fn test_render_loan_details() {
    let (engine, transactions) = setup();
    let report = engine.run(AnalysisKind::Loan, &transactions).unwrap();
    let text = render(&report);

    assert!(text.contains("2024-01-02 to 2024-04-15 (4 months)"));
    assert!(text.contains("Monthly income:"));
    assert!(text.contains("2500.00"));
    assert!(text.contains("Reduce non-essential spending"));
}

#[test]
fn test_render_empty_reports() {
    let engine = AnalyticsEngine::new(&AnalyticsConfig::default()).unwrap();
    let text = render(&engine.run(AnalysisKind::PaymentMix, &[]).unwrap());
    assert!(text.contains("No expenses found"));

    let text = render(&engine.run(AnalysisKind::Trends, &[]).unwrap());
    assert!(text.contains("Not enough monthly data"));

    let text = render(&engine.run(AnalysisKind::Loan, &[]).unwrap());
    assert!(text.contains("n/a"));
}

#[test]
fn test_cmd_analyze_and_all() {
    let (engine, transactions) = setup();
    assert!(commands::cmd_analyze(&engine, &transactions, AnalysisKind::Savings, false).is_ok());
    assert!(commands::cmd_analyze(&engine, &transactions, AnalysisKind::Trends, true).is_ok());
    assert!(commands::cmd_all(&engine, &transactions, true).is_ok());
}

#[test]
fn test_cmd_analyze_unregistered_kind() {
    let engine = AnalyticsEngine::empty();
    let result = commands::cmd_analyze(&engine, &[], AnalysisKind::Loan, false);
    assert!(result.is_err());
}

// ========== Question Answering Tests ==========

#[tokio::test]
async fn test_answer_without_narrator_shows_report() {
    let (engine, transactions) = setup();

    let answer = commands::answer_question(&engine, &transactions, None, "Can I save money?")
        .await
        .unwrap();
    assert_eq!(answer.report.kind(), AnalysisKind::Savings);
    assert!(answer.narrative.is_none());

    let mut out = Vec::new();
    commands::write_answer(&mut out, &answer, false).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Savings potential"));
    assert!(text.contains("Target:"));
}

#[tokio::test]
async fn test_answer_unrouted_question() {
    let (engine, transactions) = setup();
    let answer =
        commands::answer_question(&engine, &transactions, None, "What is the capital of Peru?")
            .await;
    assert!(answer.is_none());
}

#[tokio::test]
async fn test_answer_with_mock_narrator() {
    let (engine, transactions) = setup();
    let narrator = NarratorClient::mock();

    let answer = commands::answer_question(
        &engine,
        &transactions,
        Some(&narrator),
        "Were there any unusual expenses?",
    )
    .await
    .unwrap();

    assert_eq!(answer.report.kind(), AnalysisKind::Anomalies);
    let narrative = answer.narrative.as_deref().unwrap();
    assert!(narrative.starts_with("Unusual expenses: "));

    // Narrative only, unless details are requested
    let mut out = Vec::new();
    commands::write_answer(&mut out, &answer, false).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("Window:"));

    let mut out = Vec::new();
    commands::write_answer(&mut out, &answer, true).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Window:"));
}

#[tokio::test]
async fn test_answer_with_chat_server() {
    let server = MockChatServer::start().await;
    let narrator =
        NarratorClient::OpenAICompatible(OpenAICompatibleNarrator::new(&server.url(), "m"));
    let (engine, transactions) = setup();

    let answer = commands::answer_question(
        &engine,
        &transactions,
        Some(&narrator),
        "How much could I borrow?",
    )
    .await
    .unwrap();

    assert_eq!(answer.report.kind(), AnalysisKind::Loan);
    assert!(answer
        .narrative
        .unwrap()
        .contains("Summary of the loan analysis"));
    // One classification call, one narration call
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_answer_falls_back_when_chat_server_fails() {
    let server = MockChatServer::start_failing(StatusCode::INTERNAL_SERVER_ERROR).await;
    let narrator = NarratorClient::OpenAICompatible(
        OpenAICompatibleNarrator::new(&server.url(), "m").with_max_retries(0),
    );
    let (engine, transactions) = setup();

    let answer = commands::answer_question(
        &engine,
        &transactions,
        Some(&narrator),
        "What are my main spending categories?",
    )
    .await
    .unwrap();

    // Routed by keyword, report shown without narrative
    assert_eq!(answer.report.kind(), AnalysisKind::Categories);
    assert!(answer.narrative.is_none());
}

#[tokio::test]
async fn test_interactive_session() {
    let (engine, transactions) = setup();
    let input = Cursor::new("What do I spend on direct debits?\n\nhello there\nquit\nCan I save?\n");
    let mut out = Vec::new();

    let answered = commands::run_interactive(input, &mut out, &engine, &transactions, None, false)
        .await
        .unwrap();

    // Stops at quit, so the savings question is never answered
    assert_eq!(answered, 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Recurring debits vs one-off purchases"));
    assert!(text.contains("Sorry, I can't answer that question"));
    assert!(!text.contains("Target:"));
    assert!(text.contains("Goodbye"));
}

#[tokio::test]
async fn test_interactive_ends_at_end_of_input() {
    let (engine, transactions) = setup();
    let narrator = NarratorClient::mock();
    let mut out = Vec::new();

    let answered = commands::run_interactive(
        Cursor::new("How big a mortgage can I get?\n"),
        &mut out,
        &engine,
        &transactions,
        Some(&narrator),
        false,
    )
    .await
    .unwrap();

    assert_eq!(answered, 1);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Borrowing capacity: With a monthly income"));
}
