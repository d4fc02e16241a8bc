//! Loan Capacity Calculator
//!
//! Derives average monthly income and expense over the ledger's calendar
//! span, caps the loan payment at a share of income, and converts that
//! payment into a principal with the annuity formula. A second "improved"
//! figure assumes part of discretionary spending is redirected to the loan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{AnalyticsConfig, CategoryConfig};
use crate::models::Transaction;
use crate::period::{date_bounds, inclusive_month_span};
use crate::stats::round2;

use super::engine::Analyzer;
use super::savings::REDUCTION_RATIO;
use super::types::{AnalysisKind, AnalysisReport};

/// Share of the principal recommended as down payment
pub const DOWN_PAYMENT_RATIO: f64 = 0.1;

/// Months assumed when no transaction carries a valid date
pub const DEFAULT_MONTHS: u32 = 12;

/// Payment per unit of principal: `r / (1 - (1 + r)^-n)`
///
/// With a zero rate this is `1 / n`; with no payments it is 0.
pub fn annuity_factor(monthly_rate: f64, payments: u32) -> f64 {
    if payments == 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return 1.0 / payments as f64;
    }
    let exponent = i32::try_from(payments).unwrap_or(i32::MAX);
    monthly_rate / (1.0 - (1.0 + monthly_rate).powi(-exponent))
}

/// Principal that a fixed monthly payment can service
pub fn annuity_principal(payment: f64, monthly_rate: f64, payments: u32) -> f64 {
    if payments == 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return payment * payments as f64;
    }
    payment / annuity_factor(monthly_rate, payments)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCapacityResult {
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub disposable_income: f64,
    /// Expense over income; `None` when there is no income
    pub current_debt_ratio: Option<f64>,
    pub sustainable_payment: f64,
    pub loan_principal_capacity: f64,
    /// Monthly amount freed by trimming discretionary spending
    pub discretionary_savings: f64,
    pub improved_monthly_payment: f64,
    pub improved_loan_principal_capacity: f64,
    pub recommended_down_payment: f64,
    pub total_interest_cost: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    pub months_analyzed: u32,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub recommendations: Vec<String>,
}

impl LoanCapacityResult {
    /// Extra principal unlocked by the improved scenario
    pub fn capacity_gain(&self) -> f64 {
        round2(self.improved_loan_principal_capacity - self.loan_principal_capacity)
    }
}

pub struct LoanCalculator {
    annual_rate: f64,
    term_years: u32,
    max_debt_ratio: f64,
    categories: CategoryConfig,
    recommendations: Vec<String>,
}

impl LoanCalculator {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            annual_rate: config.loan.annual_rate,
            term_years: config.loan.term_years,
            max_debt_ratio: config.loan.max_debt_ratio,
            categories: config.categories.clone(),
            recommendations: config.loan.recommendations.clone(),
        }
    }

    /// Override the loan terms
    pub fn with_terms(mut self, annual_rate: f64, term_years: u32, max_debt_ratio: f64) -> Self {
        self.annual_rate = annual_rate;
        self.term_years = term_years;
        self.max_debt_ratio = max_debt_ratio;
        self
    }

    pub fn capacity(&self, transactions: &[Transaction]) -> LoanCapacityResult {
        let bounds = date_bounds(transactions);
        let months = bounds
            .map(|(first, last)| inclusive_month_span(first, last))
            .unwrap_or(DEFAULT_MONTHS);
        let month_count = months as f64;

        let total_income: f64 = transactions
            .iter()
            .filter(|tx| tx.is_income())
            .map(|tx| tx.amount)
            .sum();
        let total_expense: f64 = transactions
            .iter()
            .filter(|tx| tx.is_expense())
            .map(|tx| tx.amount.abs())
            .sum();
        let discretionary_expense: f64 = transactions
            .iter()
            .filter(|tx| tx.is_expense())
            .filter(|tx| self.categories.is_discretionary(&tx.parent_category))
            .map(|tx| tx.amount.abs())
            .sum();

        let monthly_income = total_income / month_count;
        let monthly_expense = total_expense / month_count;
        let current_debt_ratio = (monthly_income > 0.0).then(|| monthly_expense / monthly_income);

        let sustainable_payment = monthly_income * self.max_debt_ratio;
        // Negative rates are treated as interest-free
        let monthly_rate = self.annual_rate.max(0.0) / 12.0;
        let payments = self.term_years.checked_mul(12).unwrap_or(u32::MAX);
        let capacity = annuity_principal(sustainable_payment, monthly_rate, payments);

        let discretionary_savings = discretionary_expense / month_count * REDUCTION_RATIO;
        let improved_payment = sustainable_payment + discretionary_savings;
        let improved_capacity = annuity_principal(improved_payment, monthly_rate, payments);

        let mut recommendations = Vec::with_capacity(self.recommendations.len() + 1);
        recommendations.push(format!(
            "Reduce non-essential spending by {:.2} per month to increase your borrowing capacity",
            discretionary_savings
        ));
        recommendations.extend(self.recommendations.iter().cloned());

        tracing::debug!(
            months,
            monthly_income,
            sustainable_payment,
            capacity,
            "Loan capacity computed"
        );

        LoanCapacityResult {
            monthly_income: round2(monthly_income),
            monthly_expense: round2(monthly_expense),
            disposable_income: round2(monthly_income - monthly_expense),
            current_debt_ratio,
            sustainable_payment: round2(sustainable_payment),
            loan_principal_capacity: round2(capacity),
            discretionary_savings: round2(discretionary_savings),
            improved_monthly_payment: round2(improved_payment),
            improved_loan_principal_capacity: round2(improved_capacity),
            recommended_down_payment: round2(capacity * DOWN_PAYMENT_RATIO),
            total_interest_cost: round2(sustainable_payment * payments as f64 - capacity),
            annual_rate: self.annual_rate,
            term_years: self.term_years,
            months_analyzed: months,
            period_start: bounds.map(|(first, _)| first),
            period_end: bounds.map(|(_, last)| last),
            recommendations,
        }
    }
}

impl Default for LoanCalculator {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

impl Analyzer for LoanCalculator {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Loan
    }

    fn name(&self) -> &'static str {
        "Loan Capacity"
    }

    fn analyze(&self, transactions: &[Transaction]) -> AnalysisReport {
        AnalysisReport::Loan(self.capacity(transactions))
    }
}
