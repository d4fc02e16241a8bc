//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single ledger row
///
/// Transactions are immutable once loaded; every analysis reads a shared
/// slice and builds its own result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date, `None` when the source date could not be parsed
    pub date: Option<NaiveDate>,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub description: String,
    /// Leaf category from the bank's taxonomy
    pub category: String,
    /// Parent category from the bank's taxonomy
    pub parent_category: String,
}

impl Transaction {
    pub fn new(
        date: Option<NaiveDate>,
        amount: f64,
        description: impl Into<String>,
        category: impl Into<String>,
        parent_category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
            category: category.into(),
            parent_category: parent_category.into(),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// Payment mechanism derived from the description text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Automated/scheduled payment
    RecurringDebit,
    /// Card purchase
    PointOfSale,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecurringDebit => "recurring_debit",
            Self::PointOfSale => "point_of_sale",
            Self::Other => "other",
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::RecurringDebit => "Recurring debit",
            Self::PointOfSale => "Point of sale",
            Self::Other => "Other",
        }
    }

    pub fn all() -> &'static [TransactionType] {
        &[Self::RecurringDebit, Self::PointOfSale, Self::Other]
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recurring_debit" | "recurring" => Ok(Self::RecurringDebit),
            "point_of_sale" | "pos" | "card" => Ok(Self::PointOfSale),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
