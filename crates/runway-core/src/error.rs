//! Error and warning types for Runway
//!
//! Errors abort the single computation that hit them. Warnings are returned
//! alongside partial results and never abort anything.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal condition reported next to a (possibly partial) result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Too few observations in a category to infer a pattern
    InsufficientData { category: String, observations: usize },
    /// The debt's monthly payment does not cover the interest accruing on it
    PaymentInsufficient {
        debt_id: String,
        debt_name: String,
        monthly_payment: f64,
        monthly_interest: f64,
    },
    /// A configuration item was malformed and left out of the computation
    SkippedItem { item_id: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InsufficientData {
                category,
                observations,
            } => write!(
                f,
                "not enough data for '{}' ({} observation{})",
                category,
                observations,
                if *observations == 1 { "" } else { "s" }
            ),
            Warning::PaymentInsufficient {
                debt_name,
                monthly_payment,
                monthly_interest,
                ..
            } => write!(
                f,
                "payment of {:.2} on '{}' does not cover {:.2} monthly interest",
                monthly_payment, debt_name, monthly_interest
            ),
            Warning::SkippedItem { item_id, reason } => {
                write!(f, "skipped '{}': {}", item_id, reason)
            }
        }
    }
}
