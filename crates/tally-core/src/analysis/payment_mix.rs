//! Payment Mix Analyzer
//!
//! Splits expenses by payment mechanism (recurring debit, card purchase,
//! other) and reports each mechanism's share of total spending.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::TransactionClassifier;
use crate::config::AnalyticsConfig;
use crate::models::{Transaction, TransactionType};
use crate::stats::{percentage_of, round2};
use crate::Result;

use super::engine::Analyzer;
use super::types::{AnalysisKind, AnalysisReport};

/// One payment mechanism's slice of spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTypeShare {
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentMixReport {
    /// Present mechanisms only, in [`TransactionType`] order
    pub shares: Vec<PaymentTypeShare>,
    pub total_expense: f64,
}

impl PaymentMixReport {
    pub fn share(&self, transaction_type: TransactionType) -> Option<&PaymentTypeShare> {
        self.shares
            .iter()
            .find(|s| s.transaction_type == transaction_type)
    }
}

pub struct PaymentMixAnalyzer {
    classifier: TransactionClassifier,
}

impl PaymentMixAnalyzer {
    pub fn new(classifier: TransactionClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self::new(TransactionClassifier::new(
            &config.classifier.rules,
        )?))
    }

    pub fn payment_mix(&self, transactions: &[Transaction]) -> PaymentMixReport {
        let mut groups: BTreeMap<TransactionType, (f64, usize)> = BTreeMap::new();
        for tx in transactions.iter().filter(|tx| tx.is_expense()) {
            let entry = groups
                .entry(self.classifier.classify_transaction(tx))
                .or_insert((0.0, 0));
            entry.0 += tx.amount.abs();
            entry.1 += 1;
        }

        let total: f64 = groups.values().map(|(amount, _)| amount).sum();
        if total <= 0.0 {
            return PaymentMixReport::default();
        }

        let shares = groups
            .into_iter()
            .map(|(transaction_type, (amount, count))| PaymentTypeShare {
                transaction_type,
                amount: round2(amount),
                percentage: percentage_of(amount, total),
                transaction_count: count,
            })
            .collect();

        PaymentMixReport {
            shares,
            total_expense: round2(total),
        }
    }
}

impl Default for PaymentMixAnalyzer {
    fn default() -> Self {
        Self::new(TransactionClassifier::default())
    }
}

impl Analyzer for PaymentMixAnalyzer {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::PaymentMix
    }

    fn name(&self) -> &'static str {
        "Payment Mix"
    }

    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport {
        AnalysisReport::PaymentMix(self.payment_mix(transactions))
    }
}
