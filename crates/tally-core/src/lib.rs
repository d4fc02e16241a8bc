//! Tally Core Library
//!
//! Financial analytics over a personal bank-transaction ledger:
//! - Ledger import from CSV exports
//! - Payment-mechanism classification (recurring debits vs card purchases)
//! - Category breakdown and budget-norm comparison
//! - Per-category z-score detection of unusual recent expenses
//! - Month-over-month spending trends
//! - Savings planning toward a monthly target
//! - Mortgage borrowing capacity (annuity formula)
//! - Pluggable narrative backends that turn results into prose

pub mod analysis;
pub mod classify;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod narrative;
pub mod period;
pub mod question;
pub mod stats;

/// Test utilities including a mock chat-completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{AnalysisKind, AnalysisReport, AnalyticsEngine, Analyzer};
pub use classify::{ClassifierRule, PatternType, TransactionClassifier};
pub use config::AnalyticsConfig;
pub use error::{Error, Result};
pub use import::{load_ledger, parse_ledger};
pub use models::{Transaction, TransactionType};
pub use narrative::{MockNarrator, Narrator, NarratorClient, OpenAICompatibleNarrator};
pub use period::YearMonth;
pub use question::{normalize_label, route_question};
