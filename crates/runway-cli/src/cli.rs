//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Runway - See how far your money goes
#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Cash flow projection and budget classification", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Financial configuration (JSON)
    #[arg(short, long, default_value = "runway.json", global = true)]
    pub config: PathBuf,

    /// Transaction history (CSV or JSON)
    #[arg(short, long, global = true)]
    pub transactions: Option<PathBuf>,

    /// Classifier rules (TOML), overriding the user and built-in rules
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project balances month by month
    Project {
        /// Number of months to project, starting with the current one
        #[arg(short, long, default_value = "12")]
        months: u32,

        /// Blend in predicted spending from transaction history
        #[arg(long)]
        blend: bool,
    },

    /// Simulate debt payoff and forgiveness
    Debts {
        /// Show one point per year instead of per month
        #[arg(long)]
        yearly: bool,

        /// How many years to simulate (max 100)
        #[arg(long, default_value = "30")]
        horizon_years: u32,
    },

    /// Classify a transaction description
    Classify {
        /// Description as it appears on the bank statement
        description: String,

        /// Signed amount (negative = expense)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        amount: f64,
    },

    /// Detect recurring spending patterns in the transaction history
    Patterns,

    /// Show the current month's 50/30/20 budget split
    Tiers,

    /// Print the effective classifier rules
    Rules,
}
