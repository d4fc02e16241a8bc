//! Savings Planner
//!
//! Estimates how much could be saved each month by trimming discretionary
//! categories by a fixed ratio, and whether that reaches the monthly target.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{AnalyticsConfig, CategoryConfig};
use crate::models::Transaction;
use crate::period::distinct_months;
use crate::stats::round2;

use super::engine::Analyzer;
use super::types::{AnalysisKind, AnalysisReport};

/// Share of a discretionary category's monthly spend assumed reducible
pub const REDUCTION_RATIO: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReduction {
    pub category: String,
    pub monthly_expense: f64,
    pub possible_reduction: f64,
    pub new_expense: f64,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlan {
    pub monthly_target: f64,
    /// Distinct months with dated expenses, at least 1
    pub months_observed: usize,
    pub total_savings: f64,
    pub target_met: bool,
    /// Zero when the target is met
    pub shortfall: f64,
    /// Largest monthly expense first
    pub reductions: Vec<CategoryReduction>,
    /// Only filled when the target is not met
    pub essential_suggestions: Vec<String>,
}

impl SavingsPlan {
    /// Savings beyond the target, zero when the target is missed
    pub fn surplus(&self) -> f64 {
        round2((self.total_savings - self.monthly_target).max(0.0))
    }
}

pub struct SavingsPlanner {
    monthly_target: f64,
    categories: CategoryConfig,
    suggestions: BTreeMap<String, Vec<String>>,
    essential_suggestions: Vec<String>,
}

impl SavingsPlanner {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            monthly_target: config.savings.monthly_target,
            categories: config.categories.clone(),
            suggestions: config.savings.suggestions.clone(),
            essential_suggestions: config.savings.essential_suggestions.clone(),
        }
    }

    /// Override the monthly target
    pub fn with_target(mut self, monthly_target: f64) -> Self {
        self.monthly_target = monthly_target;
        self
    }

    pub fn plan(&self, transactions: &[Transaction]) -> SavingsPlan {
        let expenses: Vec<&Transaction> = transactions.iter().filter(|tx| tx.is_expense()).collect();
        let months_observed = distinct_months(expenses.iter().copied()).len().max(1);

        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for tx in &expenses {
            *totals.entry(tx.parent_category.as_str()).or_insert(0.0) += tx.amount.abs();
        }

        let mut reductions: Vec<CategoryReduction> = totals
            .into_iter()
            .filter(|(category, _)| self.categories.is_discretionary(category))
            .map(|(category, total)| {
                let monthly_expense = round2(total / months_observed as f64);
                let possible_reduction = round2(monthly_expense * REDUCTION_RATIO);
                CategoryReduction {
                    category: category.to_string(),
                    monthly_expense,
                    possible_reduction,
                    new_expense: round2(monthly_expense - possible_reduction),
                    suggestions: self.suggestions.get(category).cloned().unwrap_or_default(),
                }
            })
            .collect();
        reductions.sort_by(|a, b| b.monthly_expense.total_cmp(&a.monthly_expense));

        let total_savings = round2(reductions.iter().map(|r| r.possible_reduction).sum());
        let target_met = total_savings >= self.monthly_target;

        tracing::debug!(
            months = months_observed,
            categories = reductions.len(),
            total_savings,
            target_met,
            "Savings plan computed"
        );

        SavingsPlan {
            monthly_target: self.monthly_target,
            months_observed,
            total_savings,
            target_met,
            shortfall: round2((self.monthly_target - total_savings).max(0.0)),
            reductions,
            essential_suggestions: if target_met {
                vec![]
            } else {
                self.essential_suggestions.clone()
            },
        }
    }
}

impl Default for SavingsPlanner {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

impl Analyzer for SavingsPlanner {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Savings
    }

    fn name(&self) -> &'static str {
        "Savings Potential"
    }

    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport {
        AnalysisReport::Savings(self.plan(transactions))
    }
}
