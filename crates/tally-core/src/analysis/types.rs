//! Core types shared by the analyzers and their consumers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::anomaly::AnomalyReport;
use super::budget::BudgetComparison;
use super::categories::CategoryBreakdown;
use super::loan::LoanCapacityResult;
use super::payment_mix::PaymentMixReport;
use super::savings::SavingsPlan;
use super::trends::TrendReport;

/// The analyses the engine can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Recurring debits vs one-off card purchases
    PaymentMix,
    /// Spending by parent category against budget norms
    Categories,
    /// Statistically unusual recent expenses
    Anomalies,
    /// Month-over-month change per category
    Trends,
    /// Monthly savings potential toward a target
    Savings,
    /// Mortgage borrowing capacity
    Loan,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::PaymentMix => "payment_mix",
            AnalysisKind::Categories => "categories",
            AnalysisKind::Anomalies => "anomalies",
            AnalysisKind::Trends => "trends",
            AnalysisKind::Savings => "savings",
            AnalysisKind::Loan => "loan",
        }
    }

    /// Report heading
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::PaymentMix => "Recurring debits vs one-off purchases",
            AnalysisKind::Categories => "Spending by category",
            AnalysisKind::Anomalies => "Unusual expenses",
            AnalysisKind::Trends => "Monthly trends",
            AnalysisKind::Savings => "Savings potential",
            AnalysisKind::Loan => "Borrowing capacity",
        }
    }

    pub fn all() -> &'static [AnalysisKind] {
        &[
            AnalysisKind::PaymentMix,
            AnalysisKind::Categories,
            AnalysisKind::Anomalies,
            AnalysisKind::Trends,
            AnalysisKind::Savings,
            AnalysisKind::Loan,
        ]
    }

    /// Kinds a free-form question can be routed to
    pub fn question_kinds() -> &'static [AnalysisKind] {
        &[
            AnalysisKind::PaymentMix,
            AnalysisKind::Categories,
            AnalysisKind::Anomalies,
            AnalysisKind::Savings,
            AnalysisKind::Loan,
        ]
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_mix" | "mix" => Ok(AnalysisKind::PaymentMix),
            "categories" => Ok(AnalysisKind::Categories),
            "anomalies" => Ok(AnalysisKind::Anomalies),
            "trends" => Ok(AnalysisKind::Trends),
            "savings" => Ok(AnalysisKind::Savings),
            "loan" => Ok(AnalysisKind::Loan),
            _ => Err(format!("Unknown analysis kind: {}", s)),
        }
    }
}

/// Category breakdown together with its budget-norm comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub breakdown: CategoryBreakdown,
    pub comparison: Vec<BudgetComparison>,
}

/// Result of one analysis, tagged with its kind when serialized
///
/// ```json
/// { "analysis": "loan", "monthly_income": 3000.0, ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisReport {
    PaymentMix(PaymentMixReport),
    Categories(CategoryReport),
    Anomalies(AnomalyReport),
    Trends(TrendReport),
    Savings(SavingsPlan),
    Loan(LoanCapacityResult),
}

impl AnalysisReport {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisReport::PaymentMix(_) => AnalysisKind::PaymentMix,
            AnalysisReport::Categories(_) => AnalysisKind::Categories,
            AnalysisReport::Anomalies(_) => AnalysisKind::Anomalies,
            AnalysisReport::Trends(_) => AnalysisKind::Trends,
            AnalysisReport::Savings(_) => AnalysisKind::Savings,
            AnalysisReport::Loan(_) => AnalysisKind::Loan,
        }
    }

    /// Number of rows in the report's main listing, for logging
    pub fn item_count(&self) -> usize {
        match self {
            AnalysisReport::PaymentMix(r) => r.shares.len(),
            AnalysisReport::Categories(r) => r.breakdown.categories.len(),
            AnalysisReport::Anomalies(r) => r.anomalies.len(),
            AnalysisReport::Trends(r) => r.trends.len(),
            AnalysisReport::Savings(r) => r.reductions.len(),
            AnalysisReport::Loan(r) => r.recommendations.len(),
        }
    }

    /// Plain JSON value for downstream consumers
    pub fn to_json(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_str_roundtrip() {
        for kind in AnalysisKind::all() {
            assert_eq!(AnalysisKind::from_str(kind.as_str()).unwrap(), *kind);
        }
        assert_eq!(
            AnalysisKind::from_str("mix").unwrap(),
            AnalysisKind::PaymentMix
        );
        assert!(AnalysisKind::from_str("budget").is_err());
    }

    #[test]
    fn test_question_kinds_exclude_trends() {
        assert_eq!(AnalysisKind::question_kinds().len(), 5);
        assert!(!AnalysisKind::question_kinds().contains(&AnalysisKind::Trends));
    }

    #[test]
    fn test_report_is_tagged_with_kind() {
        let report = AnalysisReport::Trends(TrendReport::default());
        let json = report.to_json().unwrap();
        assert_eq!(json["analysis"], "trends");
        assert!(json["trends"].as_array().unwrap().is_empty());

        let back: AnalysisReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), AnalysisKind::Trends);
    }
}
