//! Spending pattern command

use anyhow::Result;
use chrono::NaiveDate;
use runway_core::{Classifier, PatternAnalyzer, Transaction};

use super::{print_json, print_warnings, truncate};

pub fn cmd_patterns(
    classifier: &Classifier,
    transactions: &[Transaction],
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = PatternAnalyzer::new(classifier, today).analyze(transactions);
    if json {
        return print_json(&report);
    }

    println!();
    println!("🔁 Spending Patterns ({} transactions)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    if report.patterns.is_empty() {
        println!("   No recurring spending found.");
        println!("   💡 Tip: pass --transactions with a few months of history");
        print_warnings(&report.warnings);
        return Ok(());
    }

    println!(
        "   {:18} │ {:9} │ {:>9} │ {:>5} │ {:10} │ {:>10}",
        "Category", "Frequency", "Average", "Conf", "Last seen", "Next month"
    );
    println!("   ───────────────────┼───────────┼───────────┼───────┼────────────┼───────────");
    for p in &report.patterns {
        println!(
            "   {:18} │ {:9} │ {:>9.2} │ {:>5.2} │ {:10} │ {:>10.2}",
            truncate(&p.category, 18),
            p.frequency.as_str(),
            p.average_amount,
            p.confidence,
            p.last_occurrence.to_string(),
            p.predicted_next_amount
        );
    }

    print_warnings(&report.warnings);
    Ok(())
}
