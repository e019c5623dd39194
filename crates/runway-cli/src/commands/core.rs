//! Shared command utilities
//!
//! This module contains:
//! - `resolve_today` - Parse --as-of or fall back to the local date
//! - `open_config` / `open_transactions` / `open_classifier` - Input loading
//! - `print_json` / `print_warnings` - Output helpers

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use runway_core::{Classifier, ClassifierConfig, FinancialConfiguration, Transaction, Warning};
use serde::Serialize;
use tracing::debug;

/// The reference date for all projections
pub fn resolve_today(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid --as-of date '{}' (use YYYY-MM-DD)", s)),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn open_config(path: &Path) -> Result<FinancialConfiguration> {
    FinancialConfiguration::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Transaction history, empty when no file was given
pub fn open_transactions(path: Option<&Path>) -> Result<Vec<Transaction>> {
    let Some(path) = path else {
        debug!("No transaction history given");
        return Ok(Vec::new());
    };
    runway_core::import::load_transactions(path)
        .with_context(|| format!("Failed to load transactions from {}", path.display()))
}

pub fn open_classifier(rules: Option<&Path>) -> Result<Classifier> {
    let config = ClassifierConfig::load(rules).context("Failed to load classifier rules")?;
    Ok(Classifier::new(config))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("   ⚠️  {} warning(s):", warnings.len());
    for warning in warnings {
        println!("      - {}", warning);
    }
}
