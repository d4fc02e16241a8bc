//! Tally CLI - Financial analytics over a personal bank ledger
//!
//! Usage:
//!   tally --file ledger.csv categories        Spending by category vs budget norms
//!   tally --file ledger.csv loan --years 20   Borrowing capacity
//!   tally --file ledger.csv all --json        Every analysis as JSON
//!   tally --file ledger.csv ask "Can I save 200 a month?"
//!   tally --file ledger.csv interactive

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tally_core::AnalysisKind;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::Overrides;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let mut config = commands::load_config(cli.config.as_deref())?;
    overrides_for(&cli.command).apply(&mut config)?;

    let transactions = commands::load_transactions(&cli.file)?;
    let engine = commands::build_engine(&config)?;

    match cli.command {
        Commands::Mix => {
            commands::cmd_analyze(&engine, &transactions, AnalysisKind::PaymentMix, cli.json)
        }
        Commands::Categories => {
            commands::cmd_analyze(&engine, &transactions, AnalysisKind::Categories, cli.json)
        }
        Commands::Anomalies { .. } => {
            commands::cmd_analyze(&engine, &transactions, AnalysisKind::Anomalies, cli.json)
        }
        Commands::Trends { .. } => {
            commands::cmd_analyze(&engine, &transactions, AnalysisKind::Trends, cli.json)
        }
        Commands::Savings { .. } => {
            commands::cmd_analyze(&engine, &transactions, AnalysisKind::Savings, cli.json)
        }
        Commands::Loan { .. } => {
            commands::cmd_analyze(&engine, &transactions, AnalysisKind::Loan, cli.json)
        }
        Commands::All => commands::cmd_all(&engine, &transactions, cli.json),
        Commands::Ask { question, details } => {
            let narrator = commands::narrator_from_env(&config);
            commands::cmd_ask(
                &engine,
                &transactions,
                narrator.as_ref(),
                &question,
                details,
                cli.json,
            )
            .await
        }
        Commands::Interactive { details } => {
            let narrator = commands::narrator_from_env(&config);
            commands::cmd_interactive(&engine, &transactions, narrator, details).await
        }
    }
}

/// Parameter overrides carried by a subcommand
fn overrides_for(command: &Commands) -> Overrides {
    match *command {
        Commands::Anomalies { threshold, months } => Overrides {
            z_threshold: threshold,
            anomaly_months: months,
            ..Overrides::default()
        },
        Commands::Trends { months } => Overrides {
            trend_months: months,
            ..Overrides::default()
        },
        Commands::Savings { target } => Overrides {
            savings_target: target,
            ..Overrides::default()
        },
        Commands::Loan {
            rate,
            years,
            max_ratio,
        } => Overrides {
            annual_rate: rate,
            term_years: years,
            max_debt_ratio: max_ratio,
            ..Overrides::default()
        },
        _ => Overrides::default(),
    }
}
