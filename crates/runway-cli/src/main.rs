//! Runway CLI - Cash flow projection and budget classification
//!
//! Usage:
//!   runway project --months 12         Project balances from runway.json
//!   runway debts --yearly              Simulate debt payoff
//!   runway classify "ALBERT HEIJN" -a -45.30
//!   runway -t history.csv patterns     Detect spending patterns

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
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
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let today = commands::resolve_today(cli.as_of.as_deref())?;

    match cli.command {
        Commands::Project { months, blend } => {
            let config = commands::open_config(&cli.config)?;
            let transactions = commands::open_transactions(cli.transactions.as_deref())?;
            let classifier = commands::open_classifier(cli.rules.as_deref())?;
            commands::cmd_project(
                &config,
                &transactions,
                &classifier,
                today,
                months,
                blend,
                cli.json,
            )
        }
        Commands::Debts {
            yearly,
            horizon_years,
        } => {
            let config = commands::open_config(&cli.config)?;
            commands::cmd_debts(&config, today, horizon_years, yearly, cli.json)
        }
        Commands::Classify {
            description,
            amount,
        } => {
            let classifier = commands::open_classifier(cli.rules.as_deref())?;
            commands::cmd_classify(&classifier, &description, amount, cli.json)
        }
        Commands::Patterns => {
            let transactions = commands::open_transactions(cli.transactions.as_deref())?;
            let classifier = commands::open_classifier(cli.rules.as_deref())?;
            commands::cmd_patterns(&classifier, &transactions, today, cli.json)
        }
        Commands::Tiers => {
            let config = commands::open_config(&cli.config)?;
            let classifier = commands::open_classifier(cli.rules.as_deref())?;
            commands::cmd_tiers(&config, &classifier, today, cli.json)
        }
        Commands::Rules => {
            let classifier = commands::open_classifier(cli.rules.as_deref())?;
            commands::cmd_rules(&classifier, cli.json)
        }
    }
}
