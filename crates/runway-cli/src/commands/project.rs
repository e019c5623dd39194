//! Projection command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use runway_core::{
    BudgetTier, Classifier, FinancialConfiguration, PatternAnalyzer, ProjectionEngine, Transaction,
};
use tracing::info;

use super::{print_json, print_warnings, truncate};

pub fn cmd_project(
    config: &FinancialConfiguration,
    transactions: &[Transaction],
    classifier: &Classifier,
    today: NaiveDate,
    months: u32,
    blend: bool,
    json: bool,
) -> Result<()> {
    let mut engine = ProjectionEngine::new(today);
    if blend {
        let patterns = PatternAnalyzer::new(classifier, today).analyze(transactions);
        info!(
            "Blending {} spending pattern(s) into the projection",
            patterns.patterns.len()
        );
        engine = engine.with_patterns(patterns.patterns);
    }

    let report = engine.project(config, transactions, &config.liabilities, months);
    if json {
        return print_json(&report);
    }

    println!();
    println!(
        "📈 Projection: {} month(s) from {} (starting balance {:.2})",
        months, today, config.starting_balance
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if report.months.is_empty() {
        println!("   Nothing to project.");
        print_warnings(&report.warnings);
        return Ok(());
    }

    println!(
        "   {:7} │ {:>10} │ {:>10} │ {:>9} │ {:>11} │ {:>11} │ {:>4}",
        "Month", "Income", "Expenses", "Predicted", "Balance", "Net worth", "Conf"
    );
    println!("   ────────┼────────────┼────────────┼───────────┼─────────────┼─────────────┼──────");
    for m in &report.months {
        println!(
            "   {:7} │ {:>10.2} │ {:>10.2} │ {:>9.2} │ {:>11.2} │ {:>11.2} │ {:>3.0}%",
            m.month.to_string(),
            m.configured_income,
            m.configured_expenses,
            m.predicted_expenses,
            m.projected_balance,
            m.net_worth,
            m.confidence
        );
    }

    if let Some(current) = report.months.first() {
        if let (Some(income), Some(spent)) = (current.actual_income, current.actual_expenses) {
            println!();
            println!("   So far in {}:", current.month);
            println!(
                "     Income:   {:>10.2} of {:.2} configured",
                income, current.configured_income
            );
            println!(
                "     Expenses: {:>10.2} of {:.2} configured",
                spent, current.configured_expenses
            );
        }

        println!();
        println!("   {} breakdown:", current.month);
        for line in current.income_breakdown.iter() {
            println!("     + {:28} {:>10.2}", truncate(&line.name, 28), line.amount);
        }
        for line in current.expense_breakdown.iter() {
            println!("     - {:28} {:>10.2}", truncate(&line.name, 28), line.amount);
        }
    }

    print_warnings(&report.warnings);
    Ok(())
}

pub fn cmd_tiers(
    config: &FinancialConfiguration,
    classifier: &Classifier,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = ProjectionEngine::new(today).project(config, &[], &config.liabilities, 1);
    let month = report
        .months
        .first()
        .context("Projection returned no months")?;
    let summary = classifier.summarize_tiers(month);
    if json {
        return print_json(&summary);
    }

    println!();
    println!("🧮 Budget Tiers for {} (income {:.2})", month.month, summary.income);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:8} │ {:>10} │ {:>8} │ {:>7}",
        "Tier", "Amount", "Actual", "Target"
    );
    println!("   ─────────┼────────────┼──────────┼────────");
    for tier in &summary.tiers {
        let off_target = match tier.tier {
            BudgetTier::Savings => tier.percent_of_income < tier.target_percent,
            _ => tier.percent_of_income > tier.target_percent,
        };
        let flag = if off_target {
            " ⚠️"
        } else {
            ""
        };
        println!(
            "   {:8} │ {:>10.2} │ {:>7.1}% │ {:>6.0}%{}",
            tier.tier.as_str(),
            tier.amount,
            tier.percent_of_income,
            tier.target_percent,
            flag
        );
    }

    print_warnings(&report.warnings);
    Ok(())
}
