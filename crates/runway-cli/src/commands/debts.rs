//! Debt simulation command

use anyhow::Result;
use chrono::NaiveDate;
use runway_core::{DebtSimulator, FinancialConfiguration, Granularity};

use super::{print_json, print_warnings, truncate};

pub fn cmd_debts(
    config: &FinancialConfiguration,
    today: NaiveDate,
    horizon_years: u32,
    yearly: bool,
    json: bool,
) -> Result<()> {
    let simulator =
        DebtSimulator::new(today).with_horizon_months(horizon_years.saturating_mul(12));
    let report = simulator.simulate_all(&config.liabilities);
    if json {
        return print_json(&report);
    }

    let granularity = if yearly {
        Granularity::Yearly
    } else {
        Granularity::Monthly
    };

    println!();
    println!("💳 Debt Simulation (from {})", today);
    println!("   ─────────────────────────────────────────────────────────────");

    if report.schedules.is_empty() {
        println!("   No active debts configured.");
        print_warnings(&report.warnings);
        return Ok(());
    }

    println!(
        "   {:20} │ {:>10} │ {:>10} │ {:>10} │ {}",
        "Debt", "Paid", "Interest", "Left", "Outcome"
    );
    println!("   ─────────────────────┼────────────┼────────────┼────────────┼──────────────");
    for schedule in &report.schedules {
        let s = &schedule.summary;
        let outcome = if let Some(month) = s.payoff_month {
            format!("paid off {}", month)
        } else if s.was_forgiven {
            format!("forgiven {:.2}", s.forgiven_amount)
        } else if s.payment_too_low {
            "payment too low".to_string()
        } else {
            "open".to_string()
        };
        println!(
            "   {:20} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {}",
            truncate(&s.debt_name, 20),
            s.total_paid,
            s.total_interest,
            s.final_balance,
            outcome
        );
    }

    println!();
    println!(
        "   {:8} │ {:>12} │ {:>10} │ {:>12} │ {:>12}",
        "Month", "Balance", "Payment", "Total paid", "Forgiveness"
    );
    println!("   ─────────┼──────────────┼────────────┼──────────────┼─────────────");
    for point in report.aggregate_series(granularity) {
        println!(
            "   {:8} │ {:>12.2} │ {:>10.2} │ {:>12.2} │ {:>12.2}",
            point.month.to_string(),
            point.balance,
            point.payment,
            point.total_paid,
            point.forgiveness
        );
    }

    println!();
    println!("   Total paid:     {:.2}", report.total_paid());
    println!("   Total interest: {:.2}", report.total_interest());
    println!("   Forgiven:       {:.2}", report.total_forgiven());

    print_warnings(&report.warnings);
    Ok(())
}
