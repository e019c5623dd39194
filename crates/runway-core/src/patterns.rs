//! Expense pattern analysis
//!
//! Groups historical expenses by category and infers how often each category
//! recurs and how much to expect next time. Detection uses the mean interval
//! between consecutive observations:
//!
//! | Mean interval | Frequency | Base confidence |
//! |---------------|-----------|-----------------|
//! | ≤ 2 days      | daily     | 0.8             |
//! | ≤ 10 days     | weekly    | 0.7             |
//! | ≤ 40 days     | monthly   | 0.6             |
//! | otherwise     | irregular | 0.3             |
//!
//! Consistent amounts (coefficient of variation < 0.2) add 0.2, erratic ones
//! (> 0.5) subtract 0.2, and the result is clamped to [0.1, 0.9].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::classify::Classifier;
use crate::error::Warning;
use crate::models::{ExpensePattern, PatternFrequency, Transaction};

/// Categories need at least this many observations to form a pattern
pub const MIN_OBSERVATIONS: usize = 2;

const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.9;

/// Patterns plus the categories left out for lack of data
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternReport {
    pub patterns: Vec<ExpensePattern>,
    pub warnings: Vec<Warning>,
}

impl PatternReport {
    pub fn get(&self, category: &str) -> Option<&ExpensePattern> {
        self.patterns.iter().find(|p| p.category == category)
    }
}

/// Infers spending patterns from expense history
pub struct PatternAnalyzer<'a> {
    classifier: &'a Classifier,
    /// Reference date for next-period predictions
    as_of: NaiveDate,
}

impl<'a> PatternAnalyzer<'a> {
    pub fn new(classifier: &'a Classifier, as_of: NaiveDate) -> Self {
        Self { classifier, as_of }
    }

    /// Detect a pattern for every expense category with enough history
    pub fn analyze(&self, transactions: &[Transaction]) -> PatternReport {
        let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| t.is_expense()) {
            groups
                .entry(self.classifier.category_for(tx))
                .or_default()
                .push(tx);
        }

        let mut report = PatternReport::default();
        for (category, group) in groups {
            if group.len() < MIN_OBSERVATIONS {
                debug!(
                    "Skipping category '{}': {} observation(s)",
                    category,
                    group.len()
                );
                report.warnings.push(Warning::InsufficientData {
                    category,
                    observations: group.len(),
                });
                continue;
            }

            let pattern = detect_pattern(category, &group, self.as_of);
            debug!(
                "Pattern for '{}': {} at {:.2} (confidence {:.2})",
                pattern.category, pattern.frequency, pattern.average_amount, pattern.confidence
            );
            report.patterns.push(pattern);
        }

        report
    }
}

fn detect_pattern(category: String, group: &[&Transaction], as_of: NaiveDate) -> ExpensePattern {
    let amounts: Vec<f64> = group.iter().map(|t| t.amount.abs()).collect();
    let average = mean(&amounts);

    let mut dates: Vec<NaiveDate> = group.iter().map(|t| t.date).collect();
    dates.sort();
    let intervals: Vec<f64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();

    let (frequency, base) = classify_interval(mean(&intervals));

    let cv = if average > 0.0 {
        std_dev(&amounts, average) / average
    } else {
        0.0
    };
    let mut confidence = base;
    if cv < 0.2 {
        confidence += 0.2;
    } else if cv > 0.5 {
        confidence -= 0.2;
    }
    // Rounded so that e.g. 0.6 + 0.2 reads back as exactly 0.8
    let confidence = (confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) * 100.0).round() / 100.0;

    // Non-empty: groups always hold at least MIN_OBSERVATIONS
    let last_occurrence = dates[dates.len() - 1];

    let mut pattern = ExpensePattern {
        category,
        average_amount: average,
        frequency,
        confidence,
        last_occurrence,
        predicted_next_amount: 0.0,
        observations: group.len(),
    };
    pattern.predicted_next_amount = predict_amount(&pattern, as_of);
    pattern
}

/// Frequency class and base confidence for a mean inter-arrival interval
fn classify_interval(mean_days: f64) -> (PatternFrequency, f64) {
    if mean_days <= 2.0 {
        (PatternFrequency::Daily, 0.8)
    } else if mean_days <= 10.0 {
        (PatternFrequency::Weekly, 0.7)
    } else if mean_days <= 40.0 {
        (PatternFrequency::Monthly, 0.6)
    } else {
        (PatternFrequency::Irregular, 0.3)
    }
}

/// Expected spend in the month following `reference_date`.
///
/// Irregular patterns are scaled by `min(1, 30 / days since last seen)`: the
/// longer since the last occurrence, the less likely it recurs within a month.
pub fn predict_amount(pattern: &ExpensePattern, reference_date: NaiveDate) -> f64 {
    match pattern.frequency {
        PatternFrequency::Daily => pattern.average_amount * 30.0,
        PatternFrequency::Weekly => pattern.average_amount * 4.3,
        PatternFrequency::Monthly => pattern.average_amount,
        PatternFrequency::Irregular => {
            let days_since = (reference_date - pattern.last_occurrence).num_days();
            let factor = if days_since <= 0 {
                1.0
            } else {
                (30.0 / days_since as f64).min(1.0)
            };
            pattern.average_amount * factor
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
