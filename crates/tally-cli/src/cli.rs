//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Understand where your money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Financial analytics over a personal bank ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Transaction ledger (CSV export)
    #[arg(short, long, default_value = "transactions.csv", global = true)]
    pub file: PathBuf,

    /// Analytics config file
    ///
    /// Defaults to ~/.config/tally/analytics.toml when it exists,
    /// otherwise the built-in budget norms and parameters are used.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Share of recurring direct debits vs one-off card purchases
    Mix,

    /// Spending by category compared with budget norms
    Categories,

    /// Unusual recent expenses
    Anomalies {
        /// Z-score above which an expense is flagged
        #[arg(long)]
        threshold: Option<f64>,

        /// Size of the recent window in months
        #[arg(long)]
        months: Option<u32>,
    },

    /// Month-over-month change per category
    Trends {
        /// Number of most recent months to compare
        #[arg(long)]
        months: Option<usize>,
    },

    /// Monthly savings potential toward a target
    Savings {
        /// Monthly savings target
        #[arg(long)]
        target: Option<f64>,
    },

    /// Mortgage borrowing capacity
    Loan {
        /// Annual interest rate (0.03 = 3%)
        #[arg(long)]
        rate: Option<f64>,

        /// Loan term in years
        #[arg(long)]
        years: Option<u32>,

        /// Maximum share of income spent on the loan payment
        #[arg(long)]
        max_ratio: Option<f64>,
    },

    /// Run every analysis
    All,

    /// Answer a question about your finances
    ///
    /// Uses the narrator configured via NARRATOR_BACKEND / OPENAI_COMPATIBLE_HOST
    /// when available; otherwise routes by keyword and prints the detailed report.
    Ask {
        /// Question, e.g. "How much could I borrow?"
        question: String,

        /// Also print the detailed report under the narrative
        #[arg(long)]
        details: bool,
    },

    /// Ask questions in a loop (quit, exit or q to leave)
    Interactive {
        /// Also print the detailed report under each narrative
        #[arg(long)]
        details: bool,
    },
}
