//! Trend Analyzer
//!
//! Buckets dated expenses by calendar month, keeps the most recent months
//! that contain data, and reports per parent category how spending moved
//! between its first and last month with data.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::models::Transaction;
use crate::period::{distinct_months, YearMonth};
use crate::stats::{percent_change, round2};

use super::engine::Analyzer;
use super::types::{AnalysisKind, AnalysisReport};

/// Percent change below which a category is considered stable
pub const STABLE_BAND_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Stable,
    Increasing,
    Decreasing,
}

impl TrendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Stable => "stable",
            TrendStatus::Increasing => "increasing",
            TrendStatus::Decreasing => "decreasing",
        }
    }

    pub fn from_change(percent_change: f64) -> Self {
        if percent_change.abs() < STABLE_BAND_PCT {
            TrendStatus::Stable
        } else if percent_change > 0.0 {
            TrendStatus::Increasing
        } else {
            TrendStatus::Decreasing
        }
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrendStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(TrendStatus::Stable),
            "increasing" => Ok(TrendStatus::Increasing),
            "decreasing" => Ok(TrendStatus::Decreasing),
            _ => Err(format!("Unknown trend status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub category: String,
    /// Spend per month with data, only months inside the analysed range
    pub monthly_values: BTreeMap<YearMonth, f64>,
    pub percent_change: f64,
    pub status: TrendStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendReport {
    /// Largest absolute change first
    pub trends: Vec<TrendRecord>,
    /// Total spend per analysed month
    pub month_totals: BTreeMap<YearMonth, f64>,
    pub months: Vec<YearMonth>,
    /// First day of the first analysed month
    pub period_start: Option<NaiveDate>,
    /// First day of the last analysed month
    pub period_end: Option<NaiveDate>,
}

pub struct TrendAnalyzer {
    recent_months: usize,
}

impl TrendAnalyzer {
    pub fn new(recent_months: usize) -> Self {
        Self { recent_months }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.trends.recent_months)
    }

    pub fn trends(&self, transactions: &[Transaction]) -> TrendReport {
        let expenses: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| tx.is_expense() && tx.date.is_some())
            .collect();

        let all_months = distinct_months(expenses.iter().copied());
        let skip = all_months.len().saturating_sub(self.recent_months);
        let months: Vec<YearMonth> = all_months.into_iter().skip(skip).collect();

        let (Some(&first), Some(&last)) = (months.first(), months.last()) else {
            tracing::debug!("No dated expenses, trend analysis skipped");
            return TrendReport::default();
        };

        let mut month_totals: BTreeMap<YearMonth, f64> = BTreeMap::new();
        let mut by_category: BTreeMap<&str, BTreeMap<YearMonth, f64>> = BTreeMap::new();

        for tx in &expenses {
            let Some(date) = tx.date else { continue };
            let month = YearMonth::from_date(date);
            if month < first {
                continue;
            }
            *month_totals.entry(month).or_insert(0.0) += tx.amount.abs();
            *by_category
                .entry(tx.parent_category.as_str())
                .or_default()
                .entry(month)
                .or_insert(0.0) += tx.amount.abs();
        }

        let mut trends: Vec<TrendRecord> = by_category
            .into_iter()
            .filter(|(_, values)| values.len() >= 2)
            .filter_map(|(category, values)| {
                let first_value = *values.values().next()?;
                let last_value = *values.values().next_back()?;
                // Status comes from the unrounded change
                let change = percent_change(first_value, last_value);
                Some(TrendRecord {
                    category: category.to_string(),
                    monthly_values: values.into_iter().map(|(m, v)| (m, round2(v))).collect(),
                    percent_change: round2(change),
                    status: TrendStatus::from_change(change),
                })
            })
            .collect();
        trends.sort_by(|a, b| b.percent_change.abs().total_cmp(&a.percent_change.abs()));

        TrendReport {
            trends,
            month_totals: month_totals.into_iter().map(|(m, v)| (m, round2(v))).collect(),
            period_start: first.first_day(),
            period_end: last.first_day(),
            months,
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

impl Analyzer for TrendAnalyzer {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Trends
    }

    fn name(&self) -> &'static str {
        "Monthly Trends"
    }

    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport {
        AnalysisReport::Trends(self.trends(transactions))
    }
}
