//! Analytics Engine - deterministic transforms over a transaction snapshot
//!
//! Each analyzer reads the same immutable slice of [`Transaction`]s and
//! builds a fresh, serializable result. Analyzers never call each other;
//! the time-based ones share the month bucketing in [`crate::period`].
//!
//! ## Analyzers
//!
//! - **Payment mix** - recurring debits vs card purchases vs other
//! - **Categories** - spend per parent category, compared to budget norms
//! - **Anomalies** - recent expenses that are outliers for their category
//! - **Trends** - month-over-month change per parent category
//! - **Savings** - trimming discretionary categories toward a monthly target
//! - **Loan** - mortgage borrowing capacity from income and debt ratio
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::{AnalyticsConfig, AnalyticsEngine, AnalysisKind};
//!
//! let engine = AnalyticsEngine::new(&AnalyticsConfig::default())?;
//! let report = engine.run(AnalysisKind::Anomalies, &transactions);
//! ```
//!
//! [`Transaction`]: crate::models::Transaction

pub mod anomaly;
pub mod budget;
pub mod categories;
pub mod engine;
pub mod loan;
pub mod payment_mix;
pub mod savings;
pub mod trends;
pub mod types;

pub use anomaly::{AnomalyDetector, AnomalyRecord, AnomalyReport, CategoryStats};
pub use budget::{compare_with_norms, BudgetComparison, BudgetStatus};
pub use categories::{CategoryAnalyzer, CategoryBreakdown, CategoryShare};
pub use engine::{AnalyticsEngine, Analyzer};
pub use loan::{annuity_factor, annuity_principal, LoanCalculator, LoanCapacityResult};
pub use payment_mix::{PaymentMixAnalyzer, PaymentMixReport, PaymentTypeShare};
pub use savings::{CategoryReduction, SavingsPlan, SavingsPlanner};
pub use trends::{TrendAnalyzer, TrendRecord, TrendReport, TrendStatus};
pub use types::{AnalysisKind, AnalysisReport, CategoryReport};
