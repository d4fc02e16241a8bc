//! Category Analyzer
//!
//! Aggregates expenses per parent category, ranks them by amount and compares
//! each category's share with the configured budget norms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::models::Transaction;
use crate::stats::{percentage_of, round2};

use super::budget::compare_with_norms;
use super::engine::Analyzer;
use super::types::{AnalysisKind, AnalysisReport, CategoryReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Expense totals per parent category, largest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryShare>,
    pub total_expense: f64,
}

impl CategoryBreakdown {
    /// Build from a transaction snapshot; income and zero rows are ignored
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for tx in transactions.iter().filter(|tx| tx.is_expense()) {
            let entry = groups.entry(tx.parent_category.as_str()).or_insert((0.0, 0));
            entry.0 += tx.amount.abs();
            entry.1 += 1;
        }

        let total: f64 = groups.values().map(|(amount, _)| amount).sum();
        if total <= 0.0 {
            return Self::default();
        }

        let mut categories: Vec<CategoryShare> = groups
            .into_iter()
            .map(|(category, (amount, count))| CategoryShare {
                category: category.to_string(),
                amount: round2(amount),
                percentage: percentage_of(amount, total),
                transaction_count: count,
            })
            .collect();
        // Stable: equal amounts stay in name order
        categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        Self {
            categories,
            total_expense: round2(total),
        }
    }

    pub fn get(&self, category: &str) -> Option<&CategoryShare> {
        self.categories.iter().find(|c| c.category == category)
    }
}

pub struct CategoryAnalyzer {
    norms: BTreeMap<String, f64>,
}

impl CategoryAnalyzer {
    pub fn new(norms: BTreeMap<String, f64>) -> Self {
        Self { norms }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.budget.norms.clone())
    }

    pub fn categories(&self, transactions: &[Transaction]) -> CategoryReport {
        let breakdown = CategoryBreakdown::from_transactions(transactions);
        let comparison = compare_with_norms(&breakdown, &self.norms);
        CategoryReport {
            breakdown,
            comparison,
        }
    }
}

impl Analyzer for CategoryAnalyzer {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Categories
    }

    fn name(&self) -> &'static str {
        "Spending Categories"
    }

    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport {
        AnalysisReport::Categories(self.categories(transactions))
    }
}
