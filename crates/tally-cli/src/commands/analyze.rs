//! Analysis command implementations and report rendering

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::analysis::{
    AnomalyReport, BudgetStatus, CategoryReport, LoanCapacityResult, PaymentMixReport,
    SavingsPlan, TrendReport, TrendStatus,
};
use tally_core::{AnalysisKind, AnalysisReport, AnalyticsConfig, AnalyticsEngine, Transaction};

use super::truncate;

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// Per-command parameter overrides
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub z_threshold: Option<f64>,
    pub anomaly_months: Option<u32>,
    pub trend_months: Option<usize>,
    pub savings_target: Option<f64>,
    pub annual_rate: Option<f64>,
    pub term_years: Option<u32>,
    pub max_debt_ratio: Option<f64>,
}

impl Overrides {
    /// Apply overrides on top of a loaded config and re-validate it
    pub fn apply(&self, config: &mut AnalyticsConfig) -> Result<()> {
        if let Some(z) = self.z_threshold {
            config.anomaly.z_threshold = z;
        }
        if let Some(months) = self.anomaly_months {
            config.anomaly.recent_months = months;
        }
        if let Some(months) = self.trend_months {
            config.trends.recent_months = months;
        }
        if let Some(target) = self.savings_target {
            config.savings.monthly_target = target;
        }
        if let Some(rate) = self.annual_rate {
            config.loan.annual_rate = rate;
        }
        if let Some(years) = self.term_years {
            config.loan.term_years = years;
        }
        if let Some(ratio) = self.max_debt_ratio {
            config.loan.max_debt_ratio = ratio;
        }
        config.validate().context("Invalid analysis parameters")?;
        Ok(())
    }
}

pub fn cmd_analyze(
    engine: &AnalyticsEngine,
    transactions: &[Transaction],
    kind: AnalysisKind,
    json: bool,
) -> Result<()> {
    let report = engine
        .run(kind, transactions)
        .with_context(|| format!("No analyzer registered for {}", kind))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        print_json(&mut out, &report.to_json()?)?;
    } else {
        write_report(&mut out, &report)?;
    }
    Ok(())
}

pub fn cmd_all(engine: &AnalyticsEngine, transactions: &[Transaction], json: bool) -> Result<()> {
    let reports = engine.run_all(transactions);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let values = reports
            .iter()
            .map(|r| r.to_json())
            .collect::<tally_core::Result<Vec<_>>>()?;
        print_json(&mut out, &serde_json::Value::Array(values))?;
    } else {
        for report in &reports {
            write_report(&mut out, report)?;
        }
    }
    Ok(())
}

pub fn print_json<W: Write>(out: &mut W, value: &serde_json::Value) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Render a report as a human-readable table
pub fn write_report<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    match report {
        AnalysisReport::PaymentMix(r) => write_payment_mix(out, r),
        AnalysisReport::Categories(r) => write_categories(out, r),
        AnalysisReport::Anomalies(r) => write_anomalies(out, r),
        AnalysisReport::Trends(r) => write_trends(out, r),
        AnalysisReport::Savings(r) => write_savings(out, r),
        AnalysisReport::Loan(r) => write_loan(out, r),
    }
}

fn header<W: Write>(out: &mut W, icon: &str, kind: AnalysisKind) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} {}", icon, kind.label())?;
    writeln!(out, "{}", RULE)
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn write_payment_mix<W: Write>(out: &mut W, report: &PaymentMixReport) -> io::Result<()> {
    header(out, "💳", AnalysisKind::PaymentMix)?;

    if report.shares.is_empty() {
        return writeln!(out, "   No expenses found.");
    }

    writeln!(out, "   Total spending: {:.2}", report.total_expense)?;
    writeln!(out)?;
    writeln!(
        out,
        "   {:20} │ {:>10} │ {:>7} │ {:>5}",
        "Type", "Amount", "%", "Count"
    )?;
    writeln!(out, "   ─────────────────────┼────────────┼─────────┼───────")?;
    for share in &report.shares {
        writeln!(
            out,
            "   {:20} │ {:>10.2} │ {:>6.2}% │ {:>5}",
            share.transaction_type.label(),
            share.amount,
            share.percentage,
            share.transaction_count
        )?;
    }
    Ok(())
}

fn write_categories<W: Write>(out: &mut W, report: &CategoryReport) -> io::Result<()> {
    header(out, "📊", AnalysisKind::Categories)?;

    if report.breakdown.categories.is_empty() {
        return writeln!(out, "   No expenses found.");
    }

    writeln!(out, "   Total spending: {:.2}", report.breakdown.total_expense)?;
    writeln!(out)?;
    writeln!(
        out,
        "   {:22} │ {:>10} │ {:>7} │ {:>7} │ Status",
        "Category", "Amount", "%", "Norm"
    )?;
    writeln!(
        out,
        "   ───────────────────────┼────────────┼─────────┼─────────┼────────────"
    )?;
    for share in &report.breakdown.categories {
        let comparison = report
            .comparison
            .iter()
            .find(|c| c.category == share.category);
        let (norm, status) = match comparison {
            Some(c) => (
                format!("{:.2}%", c.recommended_pct),
                match c.status {
                    BudgetStatus::Above => format!("⚠️  {:+.2}", c.delta_pct),
                    BudgetStatus::Below => format!("⬇️  {:+.2}", c.delta_pct),
                    BudgetStatus::Conforming => "✅".to_string(),
                },
            ),
            None => ("-".to_string(), String::new()),
        };
        writeln!(
            out,
            "   {:22} │ {:>10.2} │ {:>6.2}% │ {:>7} │ {}",
            truncate(&share.category, 22),
            share.amount,
            share.percentage,
            norm,
            status
        )?;
    }
    Ok(())
}

fn write_anomalies<W: Write>(out: &mut W, report: &AnomalyReport) -> io::Result<()> {
    header(out, "🚨", AnalysisKind::Anomalies)?;

    if report.window_start.is_some() {
        writeln!(
            out,
            "   Window: {} to {} (z > {:.2})",
            fmt_date(report.window_start),
            fmt_date(report.window_end),
            report.z_threshold
        )?;
    }

    if report.anomalies.is_empty() {
        return writeln!(out, "   No unusual expenses found.");
    }

    writeln!(out)?;
    writeln!(
        out,
        "   {:10} │ {:28} │ {:>10} │ {:>10} │ {:>5} │ Category",
        "Date", "Description", "Amount", "Usual", "z"
    )?;
    writeln!(
        out,
        "   ───────────┼──────────────────────────────┼────────────┼────────────┼───────┼──────────"
    )?;
    for anomaly in &report.anomalies {
        writeln!(
            out,
            "   {:10} │ {:28} │ {:>10.2} │ {:>10.2} │ {:>5.2} │ {}",
            fmt_date(anomaly.date),
            truncate(&anomaly.description, 28),
            anomaly.amount,
            anomaly.baseline_mean,
            anomaly.z_score,
            anomaly.category
        )?;
    }
    Ok(())
}

fn write_trends<W: Write>(out: &mut W, report: &TrendReport) -> io::Result<()> {
    header(out, "📈", AnalysisKind::Trends)?;

    if report.trends.is_empty() {
        return writeln!(out, "   Not enough monthly data to identify trends.");
    }

    if let (Some(first), Some(last)) = (report.months.first(), report.months.last()) {
        writeln!(
            out,
            "   Months: {} to {} ({} months)",
            first,
            last,
            report.months.len()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "   {:22} │ {:>9} │ Trend", "Category", "Change")?;
    writeln!(out, "   ───────────────────────┼───────────┼────────────")?;
    for trend in &report.trends {
        let icon = match trend.status {
            TrendStatus::Increasing => "⬆️ ",
            TrendStatus::Decreasing => "⬇️ ",
            TrendStatus::Stable => "➡️ ",
        };
        writeln!(
            out,
            "   {:22} │ {:>+8.2}% │ {} {}",
            truncate(&trend.category, 22),
            trend.percent_change,
            icon,
            trend.status
        )?;
    }
    Ok(())
}

fn write_savings<W: Write>(out: &mut W, plan: &SavingsPlan) -> io::Result<()> {
    header(out, "💰", AnalysisKind::Savings)?;

    writeln!(
        out,
        "   Target: {:.2}/month   Potential: {:.2}/month   ({} months observed)",
        plan.monthly_target, plan.total_savings, plan.months_observed
    )?;
    if plan.target_met {
        writeln!(out, "   ✅ Target reachable (surplus {:.2})", plan.surplus())?;
    } else {
        writeln!(out, "   ⚠️  Short of target by {:.2}", plan.shortfall)?;
    }

    if !plan.reductions.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "   {:22} │ {:>10} │ {:>10} │ {:>10}",
            "Category", "Monthly", "Cut", "New"
        )?;
        writeln!(
            out,
            "   ───────────────────────┼────────────┼────────────┼────────────"
        )?;
        for reduction in &plan.reductions {
            writeln!(
                out,
                "   {:22} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
                truncate(&reduction.category, 22),
                reduction.monthly_expense,
                reduction.possible_reduction,
                reduction.new_expense
            )?;
            for suggestion in &reduction.suggestions {
                writeln!(out, "      • {}", suggestion)?;
            }
        }
    }

    if !plan.essential_suggestions.is_empty() {
        writeln!(out)?;
        writeln!(out, "   Also consider:")?;
        for suggestion in &plan.essential_suggestions {
            writeln!(out, "      • {}", suggestion)?;
        }
    }
    Ok(())
}

fn write_loan<W: Write>(out: &mut W, loan: &LoanCapacityResult) -> io::Result<()> {
    header(out, "🏠", AnalysisKind::Loan)?;

    writeln!(
        out,
        "   Period: {} to {} ({} months)",
        fmt_date(loan.period_start),
        fmt_date(loan.period_end),
        loan.months_analyzed
    )?;
    writeln!(out, "   Monthly income:        {:>12.2}", loan.monthly_income)?;
    writeln!(out, "   Monthly expense:       {:>12.2}", loan.monthly_expense)?;
    writeln!(out, "   Disposable income:     {:>12.2}", loan.disposable_income)?;
    match loan.current_debt_ratio {
        Some(ratio) => writeln!(out, "   Expense ratio:         {:>11.2}%", ratio * 100.0)?,
        None => writeln!(out, "   Expense ratio:         {:>12}", "n/a")?,
    }
    writeln!(out)?;
    writeln!(
        out,
        "   At {:.2}% over {} years:",
        loan.annual_rate * 100.0,
        loan.term_years
    )?;
    writeln!(out, "   Sustainable payment:   {:>12.2}", loan.sustainable_payment)?;
    writeln!(out, "   Borrowing capacity:    {:>12.2}", loan.loan_principal_capacity)?;
    writeln!(out, "   Down payment (10%):    {:>12.2}", loan.recommended_down_payment)?;
    writeln!(out, "   Total interest:        {:>12.2}", loan.total_interest_cost)?;
    writeln!(out)?;
    writeln!(
        out,
        "   Trimming discretionary spending frees {:.2}/month:",
        loan.discretionary_savings
    )?;
    writeln!(out, "   Improved payment:      {:>12.2}", loan.improved_monthly_payment)?;
    writeln!(
        out,
        "   Improved capacity:     {:>12.2} (+{:.2})",
        loan.improved_loan_principal_capacity,
        loan.capacity_gain()
    )?;

    if !loan.recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "   Recommendations:")?;
        for recommendation in &loan.recommendations {
            writeln!(out, "      • {}", recommendation)?;
        }
    }
    Ok(())
}
