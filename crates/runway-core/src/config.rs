//! Financial configuration loading
//!
//! The configuration is a single JSON document: starting balance, income
//! sources, recurring and one-time expenses, savings goals, liabilities and
//! assets. Malformed shapes (unknown frequency, bad dates, duplicate ids) are
//! rejected here; individually invalid items are left for the engine to skip
//! with a warning.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::FinancialConfiguration;

impl FinancialConfiguration {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| Error::Configuration(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&content)?;
        debug!(
            "Loaded configuration from {}: {} income, {} expenses, {} debts, {} assets",
            path.display(),
            config.income_sources.len(),
            config.recurring_expenses.len(),
            config.liabilities.len(),
            config.assets.len()
        );
        Ok(config)
    }

    /// Reject shapes that make the whole configuration unusable
    pub fn validate(&self) -> Result<()> {
        if !self.starting_balance.is_finite() {
            return Err(Error::Configuration(
                "starting balance must be a finite number".to_string(),
            ));
        }

        let ids = self
            .income_sources
            .iter()
            .map(|i| i.id.as_str())
            .chain(self.recurring_expenses.iter().map(|i| i.id.as_str()))
            .chain(self.one_time_expenses.iter().map(|e| e.id.as_str()))
            .chain(self.savings_goals.iter().map(|g| g.id.as_str()))
            .chain(self.liabilities.iter().map(|d| d.id.as_str()))
            .chain(self.assets.iter().map(|a| a.id.as_str()));

        let mut seen = HashSet::new();
        for id in ids {
            if id.trim().is_empty() {
                return Err(Error::Configuration("item with an empty id".to_string()));
            }
            if !seen.insert(id) {
                return Err(Error::Configuration(format!("duplicate item id '{}'", id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frequency;

    const SAMPLE: &str = r#"{
        "starting_balance": 1250.0,
        "income_sources": [
            {"id": "salary", "name": "Salary", "amount": 2800, "frequency": "monthly",
             "start_date": "2024-01-01", "category": "income"}
        ],
        "recurring_expenses": [
            {"id": "rent", "name": "Rent", "amount": 1000, "frequency": "monthly",
             "start_date": "2024-01-01", "category": "rent", "is_essential": true},
            {"id": "gym", "name": "Gym", "amount": 9.5, "frequency": "weekly",
             "start_date": "2024-01-01", "category": "hobbies", "is_active": false}
        ],
        "liabilities": [
            {"id": "duo", "name": "Study loan", "type": "student_loan",
             "original_amount": 20000, "current_balance": 15000, "interest_rate": 2.56,
             "monthly_payment": 120, "start_date": "2024-01-01", "end_date": "2050-01-01"}
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = FinancialConfiguration::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.starting_balance, 1250.0);
        assert_eq!(config.income_sources[0].frequency, Frequency::Monthly);
        assert!(config.income_sources[0].is_active);
        assert!(!config.recurring_expenses[1].is_active);
        assert_eq!(config.recurring_expenses[0].is_essential, Some(true));
        assert_eq!(config.liabilities[0].monthly_payment, Some(120.0));
        assert!(config.one_time_expenses.is_empty());
    }

    #[test]
    fn test_unknown_frequency_is_configuration_error() {
        let json = r#"{"income_sources": [{"id": "x", "name": "X", "amount": 1,
            "frequency": "fortnightly", "start_date": "2024-01-01", "category": "income"}]}"#;
        let err = FinancialConfiguration::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_malformed_date_is_configuration_error() {
        let json = r#"{"income_sources": [{"id": "x", "name": "X", "amount": 1,
            "frequency": "monthly", "start_date": "2024-13-01", "category": "income"}]}"#;
        assert!(matches!(
            FinancialConfiguration::from_json_str(json),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{
            "income_sources": [{"id": "a", "name": "A", "amount": 1, "frequency": "monthly",
                "start_date": "2024-01-01", "category": "income"}],
            "recurring_expenses": [{"id": "a", "name": "B", "amount": 1, "frequency": "monthly",
                "start_date": "2024-01-01", "category": "misc"}]
        }"#;
        let err = FinancialConfiguration::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate item id 'a'"));
    }

    #[test]
    fn test_empty_document_is_valid() {
        let config = FinancialConfiguration::from_json_str("{}").unwrap();
        assert_eq!(config.starting_balance, 0.0);
        assert!(config.income_sources.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FinancialConfiguration::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
