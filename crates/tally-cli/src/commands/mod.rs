//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - One-shot analyses (mix, categories, anomalies, trends, savings, loan, all)
//!   and the text rendering of reports
//! - `ask` - Question answering (ask, interactive)

pub mod analyze;
pub mod ask;

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{load_ledger, AnalyticsConfig, AnalyticsEngine, NarratorClient, Transaction};

// Re-export command functions for main.rs
pub use analyze::*;
pub use ask::*;

/// Load the analytics config (explicit path, user override, or defaults)
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    AnalyticsConfig::load(path).context("Failed to load analytics config")
}

/// Load and parse the ledger
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let transactions = load_ledger(path)
        .with_context(|| format!("Failed to load ledger {}", path.display()))?;
    if transactions.is_empty() {
        tracing::warn!(path = %path.display(), "Ledger contains no transactions");
    }
    Ok(transactions)
}

pub fn build_engine(config: &AnalyticsConfig) -> Result<AnalyticsEngine> {
    AnalyticsEngine::new(config).context("Failed to build analytics engine")
}

/// Narrator from the environment, if one is configured
pub fn narrator_from_env(config: &AnalyticsConfig) -> Option<NarratorClient> {
    let narrator =
        NarratorClient::from_env()?.with_savings_target(config.savings.monthly_target);
    tracing::info!(
        backend = narrator.backend_name(),
        model = tally_core::Narrator::model(&narrator),
        "Narrator enabled"
    );
    Some(narrator)
}

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
