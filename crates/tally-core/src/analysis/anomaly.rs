//! Anomaly Detector
//!
//! Flags recent expenses that are outliers relative to their own leaf
//! category's history, using a z-score against the category's mean and
//! sample standard deviation.
//!
//! - History is every expense in the category, dated or not.
//! - The recent window runs from `latest - recent_months` to the latest
//!   expense date. Undated expenses never fall inside it, unless no expense
//!   is dated at all; then every expense is treated as recent.
//! - Categories with fewer than [`MIN_SAMPLES`] expenses are not scored.
//! - Categories with zero spread produce no anomalies.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::models::Transaction;
use crate::period::months_before;
use crate::stats::{mean, sample_std_dev};

use super::engine::Analyzer;
use super::types::{AnalysisKind, AnalysisReport};

/// Minimum history size for a category to be scored
pub const MIN_SAMPLES: usize = 5;

/// Historical distribution of one leaf category's absolute expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub mean_absolute_expense: f64,
    pub stddev_absolute_expense: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Absolute expense amount
    pub amount: f64,
    pub category: String,
    pub parent_category: String,
    pub z_score: f64,
    pub baseline_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Highest z-score first
    pub anomalies: Vec<AnomalyRecord>,
    /// Every category that had enough history to be scored
    pub category_stats: Vec<CategoryStats>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub z_threshold: f64,
}

pub struct AnomalyDetector {
    z_threshold: f64,
    recent_months: u32,
}

impl AnomalyDetector {
    pub fn new(z_threshold: f64, recent_months: u32) -> Self {
        Self {
            z_threshold,
            recent_months,
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.anomaly.z_threshold, config.anomaly.recent_months)
    }

    pub fn detect(&self, transactions: &[Transaction]) -> AnomalyReport {
        let expenses: Vec<&Transaction> = transactions.iter().filter(|tx| tx.is_expense()).collect();

        let window_end = expenses.iter().filter_map(|tx| tx.date).max();
        let window_start = window_end.map(|latest| months_before(latest, self.recent_months));

        let in_window = |date: Option<NaiveDate>| match window_start {
            Some(start) => date.is_some_and(|date| date >= start),
            None => true,
        };

        let mut by_category: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for &tx in &expenses {
            by_category.entry(tx.category.as_str()).or_default().push(tx);
        }

        let mut category_stats = Vec::new();
        let mut anomalies = Vec::new();

        for (category, history) in by_category {
            if history.len() < MIN_SAMPLES {
                continue;
            }

            let amounts: Vec<f64> = history.iter().map(|tx| tx.amount.abs()).collect();
            let baseline_mean = mean(&amounts);
            let stddev = sample_std_dev(&amounts);

            category_stats.push(CategoryStats {
                category: category.to_string(),
                mean_absolute_expense: baseline_mean,
                stddev_absolute_expense: stddev,
                sample_count: amounts.len(),
            });

            if stddev <= 0.0 {
                continue;
            }

            for tx in history.iter().filter(|tx| in_window(tx.date)) {
                let z_score = (tx.amount.abs() - baseline_mean) / stddev;
                if z_score > self.z_threshold {
                    anomalies.push(AnomalyRecord {
                        date: tx.date,
                        description: tx.description.clone(),
                        amount: tx.amount.abs(),
                        category: tx.category.clone(),
                        parent_category: tx.parent_category.clone(),
                        z_score,
                        baseline_mean,
                    });
                }
            }
        }

        anomalies.sort_by(|a, b| b.z_score.total_cmp(&a.z_score));

        tracing::debug!(
            scored_categories = category_stats.len(),
            anomalies = anomalies.len(),
            "Anomaly detection complete"
        );

        AnomalyReport {
            anomalies,
            category_stats,
            window_start,
            window_end,
            z_threshold: self.z_threshold,
        }
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

impl Analyzer for AnomalyDetector {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Anomalies
    }

    fn name(&self) -> &'static str {
        "Unusual Expenses"
    }

    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport {
        AnalysisReport::Anomalies(self.detect(transactions))
    }
}
