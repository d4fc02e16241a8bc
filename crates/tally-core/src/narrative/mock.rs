//! Mock narrator for testing and offline use
//!
//! Classifies questions with the local keyword router and narrates reports
//! with fixed templates, so output is deterministic.

use async_trait::async_trait;

use crate::analysis::{AnalysisKind, AnalysisReport};
use crate::error::Result;
use crate::question::route_question;

use super::Narrator;

#[derive(Clone, Default)]
pub struct MockNarrator {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockNarrator {
    /// Create a new mock narrator (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock narrator
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

/// One-paragraph summary of a report
pub fn summarize(report: &AnalysisReport) -> String {
    match report {
        AnalysisReport::PaymentMix(r) => {
            let parts: Vec<String> = r
                .shares
                .iter()
                .map(|s| format!("{} {:.2}%", s.transaction_type.label(), s.percentage))
                .collect();
            if parts.is_empty() {
                "No expenses were found in the ledger.".to_string()
            } else {
                format!(
                    "Total spending was {:.2}: {}.",
                    r.total_expense,
                    parts.join(", ")
                )
            }
        }
        AnalysisReport::Categories(r) => match r.breakdown.categories.first() {
            Some(top) => {
                let above = r
                    .comparison
                    .iter()
                    .filter(|c| c.status == crate::analysis::BudgetStatus::Above)
                    .count();
                format!(
                    "Your largest category is {} at {:.2}% of {:.2} spent. {} categories are above their recommended share.",
                    top.category, top.percentage, r.breakdown.total_expense, above
                )
            }
            None => "No expenses were found in the ledger.".to_string(),
        },
        AnalysisReport::Anomalies(r) => match r.anomalies.first() {
            Some(top) => format!(
                "{} unusual expenses were found. The most unusual is {} ({:.2}, {:.2} standard deviations above the usual {:.2} for {}).",
                r.anomalies.len(),
                top.description,
                top.amount,
                top.z_score,
                top.baseline_mean,
                top.category
            ),
            None => "No unusual expenses were found in the recent period.".to_string(),
        },
        AnalysisReport::Trends(r) => match r.trends.first() {
            Some(top) => format!(
                "Over {} months, {} moved the most ({:+.2}%, {}).",
                r.months.len(),
                top.category,
                top.percent_change,
                top.status
            ),
            None => "Not enough monthly data to identify trends.".to_string(),
        },
        AnalysisReport::Savings(r) => {
            if r.target_met {
                format!(
                    "Trimming discretionary spending could save {:.2} a month, meeting the {:.2} target.",
                    r.total_savings, r.monthly_target
                )
            } else {
                format!(
                    "Trimming discretionary spending could save {:.2} a month, {:.2} short of the {:.2} target.",
                    r.total_savings, r.shortfall, r.monthly_target
                )
            }
        }
        AnalysisReport::Loan(r) => format!(
            "With a monthly income of {:.2}, a sustainable payment of {:.2} supports a loan of about {:.2} over {} years ({:.2} with reduced discretionary spending).",
            r.monthly_income,
            r.sustainable_payment,
            r.loan_principal_capacity,
            r.term_years,
            r.improved_loan_principal_capacity
        ),
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn classify_question(&self, question: &str) -> Result<Option<AnalysisKind>> {
        Ok(route_question(question))
    }

    async fn narrate(&self, report: &AnalysisReport) -> Result<String> {
        Ok(format!(
            "{}: {}",
            report.kind().label(),
            summarize(report)
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }
}
