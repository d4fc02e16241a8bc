//! Analytics configuration
//!
//! Reference tables (budget norms, discretionary categories, suggestion
//! texts, classifier rules) and analyzer parameters live here so they can be
//! substituted per user or per test instead of being module-level globals.
//!
//! ## Configuration Resolution
//!
//! 1. Explicit path passed by the caller (`--config`)
//! 2. Override in the platform config dir (~/.config/tally/analytics.toml)
//! 3. Built-in defaults
//!
//! Every section is optional in a file; missing sections and keys keep their
//! defaults. Category names must match the ledger's vocabulary exactly: a
//! mismatch yields a 0% recommendation or an excluded category, not an error.
//! The defaults use the parent categories of the bank export (`Logement`,
//! `Loisirs & Sorties`, `Achats & Shopping`, ...).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::ClassifierRule;
use crate::error::{Error, Result};

/// Longest loan term accepted, in years
pub const MAX_TERM_YEARS: u32 = 100;

/// Full analytics configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub classifier: ClassifierConfig,
    pub categories: CategoryConfig,
    pub budget: BudgetConfig,
    pub anomaly: AnomalyConfig,
    pub trends: TrendConfig,
    pub savings: SavingsConfig,
    pub loan: LoanConfig,
}

/// Ordered payment-mechanism rules, first match wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: ClassifierRule::defaults(),
        }
    }
}

/// Category taxonomy shared by the savings planner and loan calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Parent categories considered reducible without touching essentials
    pub discretionary: Vec<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            discretionary: [
                "Loisirs & Sorties",
                "Achats & Shopping",
                "Voyages / Vacances",
                "Esthétique & Soins",
                "Divers",
                "Restaurants",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl CategoryConfig {
    pub fn is_discretionary(&self, category: &str) -> bool {
        self.discretionary.iter().any(|c| c == category)
    }
}

/// Recommended share of total spending per parent category, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub norms: BTreeMap<String, f64>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        // 50/30/20-style split refined per category
        let norms = [
            ("Logement", 25.0),
            ("Alimentation & Restau.", 15.0),
            ("Auto & Transports", 15.0),
            ("Loisirs & Sorties", 10.0),
            ("Achats & Shopping", 10.0),
            ("Santé", 5.0),
            ("Abonnements", 5.0),
            ("Banque", 5.0),
            ("Impôts & Taxes", 5.0),
            ("Esthétique & Soins", 2.0),
            ("Divers", 3.0),
        ]
        .iter()
        .map(|(name, pct)| (name.to_string(), *pct))
        .collect();
        Self { norms }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Z-score above which a recent expense is reported
    pub z_threshold: f64,
    /// Length of the recent window, in calendar months back from the latest date
    pub recent_months: u32,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.5,
            recent_months: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Maximum number of most recent months with data to analyse
    pub recent_months: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { recent_months: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsConfig {
    /// Monthly savings goal, in currency units
    pub monthly_target: f64,
    /// Suggestions for essential spending, shown when the target is missed
    pub essential_suggestions: Vec<String>,
    /// Suggestions keyed by discretionary category
    pub suggestions: BTreeMap<String, Vec<String>>,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        let suggestions: BTreeMap<String, Vec<String>> = [
            (
                "Loisirs & Sorties",
                vec![
                    "Cut restaurant or bar outings by one or two a month",
                    "Look for free or discounted activities",
                    "Use discount apps and group offers",
                ],
            ),
            (
                "Achats & Shopping",
                vec![
                    "Postpone non-essential purchases",
                    "Compare prices before buying",
                    "Favour sales and promotions",
                ],
            ),
            (
                "Voyages / Vacances",
                vec![
                    "Book trips early to get better fares",
                    "Prefer less expensive destinations",
                    "Travel less often",
                ],
            ),
            (
                "Esthétique & Soins",
                vec![
                    "Space out non-essential treatments",
                    "Look for cheaper alternatives",
                ],
            ),
            (
                "Divers",
                vec![
                    "Review paid subscriptions and services",
                    "Cancel rarely used services",
                ],
            ),
            (
                "Restaurants",
                vec!["Cook more meals at home", "Limit meal deliveries"],
            ),
        ]
        .into_iter()
        .map(|(cat, tips)| {
            (
                cat.to_string(),
                tips.into_iter().map(String::from).collect::<Vec<_>>(),
            )
        })
        .collect();

        Self {
            monthly_target: 200.0,
            essential_suggestions: vec![
                "Compare energy and telecom provider offers".to_string(),
                "Negotiate bank fees with your bank".to_string(),
                "Review insurance contracts for overlaps or over-insurance".to_string(),
            ],
            suggestions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanConfig {
    /// Annual interest rate as a fraction (0.03 = 3%)
    pub annual_rate: f64,
    pub term_years: u32,
    /// Maximum share of monthly income that may go to the loan payment
    pub max_debt_ratio: f64,
    /// General advice appended after the computed savings recommendation
    pub recommendations: Vec<String>,
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            annual_rate: 0.03,
            term_years: 25,
            max_debt_ratio: 0.33,
            recommendations: vec![
                "Review and optimise insurance contracts and subscriptions".to_string(),
                "Consolidate existing high-rate debts".to_string(),
                "Save to increase your down payment".to_string(),
            ],
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration using the two-layer resolution described above
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            info!(path = %path.display(), "Loading analytics config");
            return Self::from_file(path);
        }

        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            info!(path = %path.display(), "Loading analytics config override");
            return Self::from_file(&path);
        }

        debug!("Using built-in analytics config");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject parameters no analyzer can work with
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("anomaly.z_threshold", self.anomaly.z_threshold),
            ("savings.monthly_target", self.savings.monthly_target),
            ("loan.annual_rate", self.loan.annual_rate),
            ("loan.max_debt_ratio", self.loan.max_debt_ratio),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(Error::Config(format!("{} must be a finite number", key)));
            }
        }
        if self.trends.recent_months == 0 {
            return Err(Error::Config(
                "trends.recent_months must be at least 1".to_string(),
            ));
        }
        if self.loan.max_debt_ratio < 0.0 {
            return Err(Error::Config(
                "loan.max_debt_ratio must not be negative".to_string(),
            ));
        }
        if self.loan.annual_rate < 0.0 {
            return Err(Error::Config(
                "loan.annual_rate must not be negative".to_string(),
            ));
        }
        if self.loan.term_years == 0 || self.loan.term_years > MAX_TERM_YEARS {
            return Err(Error::Config(format!(
                "loan.term_years must be between 1 and {}",
                MAX_TERM_YEARS
            )));
        }
        if self.budget.norms.values().any(|pct| !pct.is_finite()) {
            return Err(Error::Config(
                "budget.norms values must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Location of the per-user override file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tally").join("analytics.toml"))
}
