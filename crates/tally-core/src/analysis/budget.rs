//! Budget norm comparison

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stats::round2;

use super::categories::CategoryBreakdown;

/// Percentage points within which a category counts as conforming
pub const CONFORMITY_TOLERANCE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Conforming,
    Above,
    Below,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Conforming => "conforming",
            BudgetStatus::Above => "above",
            BudgetStatus::Below => "below",
        }
    }

    /// Status for a difference `actual - recommended`, in percentage points
    pub fn from_delta(delta: f64) -> Self {
        if delta.abs() <= CONFORMITY_TOLERANCE {
            BudgetStatus::Conforming
        } else if delta > 0.0 {
            BudgetStatus::Above
        } else {
            BudgetStatus::Below
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conforming" => Ok(BudgetStatus::Conforming),
            "above" => Ok(BudgetStatus::Above),
            "below" => Ok(BudgetStatus::Below),
            _ => Err(format!("Unknown budget status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub category: String,
    pub actual_pct: f64,
    pub recommended_pct: f64,
    pub delta_pct: f64,
    pub status: BudgetStatus,
}

impl BudgetComparison {
    pub fn new(category: impl Into<String>, actual_pct: f64, recommended_pct: f64) -> Self {
        let delta_pct = round2(actual_pct - recommended_pct);
        Self {
            category: category.into(),
            actual_pct,
            recommended_pct,
            delta_pct,
            status: BudgetStatus::from_delta(delta_pct),
        }
    }
}

/// Compare every category in the breakdown with its norm (missing norm = 0%)
///
/// Output follows the breakdown's order.
pub fn compare_with_norms(
    breakdown: &CategoryBreakdown,
    norms: &BTreeMap<String, f64>,
) -> Vec<BudgetComparison> {
    breakdown
        .categories
        .iter()
        .map(|share| {
            let recommended = norms.get(&share.category).copied().unwrap_or(0.0);
            BudgetComparison::new(share.category.clone(), share.percentage, recommended)
        })
        .collect()
}
