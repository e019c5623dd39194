//! Month-by-month cash flow projection
//!
//! For each month starting with the current one:
//! 1. Configured income and recurring expenses that occur that month
//! 2. One-time expenses dated in that month
//! 3. Savings goal contributions until the goal is reached or its date passes
//! 4. Simulated debt payments, one line per debt
//! 5. Optionally, predicted spending for pattern categories with no
//!    configured expense
//!
//! The running balance is seeded from the configured starting balance. Months
//! that have already begun also report actual income and expenses from the
//! transaction history. Malformed items are skipped with a warning; the
//! engine always returns the full series.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::amortization::{DebtReport, DebtSimulator};
use crate::assets;
use crate::error::Warning;
use crate::models::{
    Asset, Debt, ExpensePattern, FinancialConfiguration, LineSource, MonthlyProjection,
    OneTimeExpense, ProjectionLine, RecurringItem, SavingsGoal, Transaction,
};
use crate::month::YearMonth;
use crate::patterns::predict_amount;
use crate::recurrence::amount_in_month;

/// Confidence of lines that come straight from configuration
pub const CONFIGURED_CONFIDENCE: f64 = 100.0;

/// Category used for savings goal contributions
pub const SAVINGS_CATEGORY: &str = "savings";

/// Category used for simulated debt payments
pub const DEBT_CATEGORY: &str = "debt";

/// Projected months plus everything that was skipped or flagged on the way
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub months: Vec<MonthlyProjection>,
    pub warnings: Vec<Warning>,
    pub debts: DebtReport,
}

impl ProjectionReport {
    pub fn final_balance(&self) -> Option<f64> {
        self.months.last().map(|m| m.projected_balance)
    }

    pub fn balances(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.projected_balance).collect()
    }
}

/// Projects balances forward from a fixed "today"
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    today: NaiveDate,
    patterns: Vec<ExpensePattern>,
}

impl ProjectionEngine {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            patterns: Vec::new(),
        }
    }

    /// Blend predictions for categories that have no configured expense
    pub fn with_patterns(mut self, patterns: Vec<ExpensePattern>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn project(
        &self,
        config: &FinancialConfiguration,
        transactions: &[Transaction],
        debts: &[Debt],
        months_ahead: u32,
    ) -> ProjectionReport {
        let mut warnings = Vec::new();
        let start = YearMonth::from_date(self.today);

        let incomes = usable_items(&config.income_sources, &mut warnings);
        let expenses = usable_items(&config.recurring_expenses, &mut warnings);
        let one_time = usable_one_time(&config.one_time_expenses, &mut warnings);
        let goals = usable_goals(&config.savings_goals, &mut warnings);
        let held_assets = usable_assets(&config.assets, &mut warnings);

        let mut debt_report = DebtSimulator::new(self.today)
            .with_horizon_months(months_ahead)
            .simulate_all(debts);
        warnings.append(&mut debt_report.warnings);

        let predicted = self.unconfigured_patterns(&expenses);
        let mut saved: Vec<f64> = goals.iter().map(|g| g.current_amount).collect();

        let mut balance = config.starting_balance;
        let mut months = Vec::with_capacity(months_ahead as usize);

        for offset in 0..months_ahead {
            let month = start.add_months(offset as i32);

            let income_breakdown: Vec<ProjectionLine> = incomes
                .iter()
                .filter_map(|item| recurring_line(item, month))
                .collect();

            let mut expense_breakdown: Vec<ProjectionLine> = expenses
                .iter()
                .filter_map(|item| recurring_line(item, month))
                .collect();

            expense_breakdown.extend(
                one_time
                    .iter()
                    .filter(|e| month.contains(e.date))
                    .map(|e| ProjectionLine {
                        item_id: e.id.clone(),
                        name: e.name.clone(),
                        category: e.category.clone(),
                        amount: e.amount,
                        source: LineSource::OneTime,
                        confidence: CONFIGURED_CONFIDENCE,
                        is_essential: None,
                    }),
            );

            for (goal, progress) in goals.iter().zip(saved.iter_mut()) {
                if let Some(line) = goal_line(goal, progress, month) {
                    expense_breakdown.push(line);
                }
            }

            for schedule in &debt_report.schedules {
                let payment = schedule.payment_for(month);
                if payment > 0.0 {
                    expense_breakdown.push(ProjectionLine {
                        item_id: schedule.summary.debt_id.clone(),
                        name: schedule.summary.debt_name.clone(),
                        category: DEBT_CATEGORY.to_string(),
                        amount: payment,
                        source: LineSource::DebtPayment,
                        confidence: CONFIGURED_CONFIDENCE,
                        is_essential: Some(true),
                    });
                }
            }

            let configured_income: f64 = income_breakdown.iter().map(|l| l.amount).sum();
            let configured_expenses: f64 = expense_breakdown.iter().map(|l| l.amount).sum();

            let predicted_lines: Vec<ProjectionLine> = predicted
                .iter()
                .map(|p| ProjectionLine {
                    item_id: format!("pattern:{}", p.category),
                    name: format!("Predicted {}", p.category),
                    category: p.category.clone(),
                    amount: predict_amount(p, month.first_day()),
                    source: LineSource::Predicted,
                    confidence: p.confidence * 100.0,
                    is_essential: None,
                })
                .filter(|l| l.amount > 0.0)
                .collect();
            let predicted_expenses: f64 = predicted_lines.iter().map(|l| l.amount).sum();
            expense_breakdown.extend(predicted_lines);

            let (actual_income, actual_expenses) = if month <= start {
                let (income, spent) = actuals(transactions, month);
                (Some(income), Some(spent))
            } else {
                (None, None)
            };

            balance += configured_income - configured_expenses - predicted_expenses;

            let confidence = weighted_confidence(income_breakdown.iter().chain(&expense_breakdown));
            let asset_value = assets::total_value_after(&held_assets, offset);
            let debt_balance: f64 = debt_report
                .schedules
                .iter()
                .map(|s| s.balance_for(month))
                .sum();

            debug!(
                "{}: income {:.2}, expenses {:.2}, predicted {:.2}, balance {:.2}",
                month, configured_income, configured_expenses, predicted_expenses, balance
            );

            months.push(MonthlyProjection {
                month,
                configured_income,
                actual_income,
                configured_expenses,
                actual_expenses,
                predicted_expenses,
                projected_balance: balance,
                income_breakdown,
                expense_breakdown,
                confidence,
                asset_value,
                debt_balance,
                net_worth: balance + asset_value - debt_balance,
            });
        }

        ProjectionReport {
            months,
            warnings,
            debts: debt_report,
        }
    }

    /// Patterns whose category no active recurring expense already covers
    fn unconfigured_patterns(&self, expenses: &[&RecurringItem]) -> Vec<ExpensePattern> {
        let configured: HashSet<String> = expenses
            .iter()
            .filter(|e| e.is_active)
            .map(|e| e.category.to_lowercase())
            .collect();
        self.patterns
            .iter()
            .filter(|p| !configured.contains(&p.category.to_lowercase()))
            .cloned()
            .collect()
    }
}

fn recurring_line(item: &RecurringItem, month: YearMonth) -> Option<ProjectionLine> {
    let amount = amount_in_month(item, month);
    if amount == 0.0 {
        return None;
    }
    Some(ProjectionLine {
        item_id: item.id.clone(),
        name: item.name.clone(),
        category: item.category.clone(),
        amount,
        source: LineSource::Recurring,
        confidence: CONFIGURED_CONFIDENCE,
        is_essential: item.is_essential,
    })
}

/// Contribution to `goal` in `month`, advancing the saved amount
fn goal_line(goal: &SavingsGoal, saved: &mut f64, month: YearMonth) -> Option<ProjectionLine> {
    if *saved >= goal.target_amount {
        return None;
    }
    if let Some(deadline) = goal.target_date {
        if month > YearMonth::from_date(deadline) {
            return None;
        }
    }
    let amount = goal.monthly_contribution.min(goal.target_amount - *saved);
    if amount <= 0.0 {
        return None;
    }
    *saved += amount;
    Some(ProjectionLine {
        item_id: goal.id.clone(),
        name: goal.name.clone(),
        category: SAVINGS_CATEGORY.to_string(),
        amount,
        source: LineSource::SavingsGoal,
        confidence: CONFIGURED_CONFIDENCE,
        is_essential: None,
    })
}

/// Income and expense magnitudes recorded in `month`
fn actuals(transactions: &[Transaction], month: YearMonth) -> (f64, f64) {
    transactions
        .iter()
        .filter(|t| month.contains(t.date))
        .fold((0.0, 0.0), |(income, spent), t| {
            if t.is_expense() {
                (income, spent + t.amount.abs())
            } else {
                (income + t.amount, spent)
            }
        })
}

/// Amount-weighted confidence of a month's lines, 100 when there are none
fn weighted_confidence<'a>(lines: impl Iterator<Item = &'a ProjectionLine>) -> f64 {
    let (weighted, total) = lines.fold((0.0, 0.0), |(weighted, total), line| {
        let weight = line.amount.abs();
        (weighted + weight * line.confidence, total + weight)
    });
    if total > 0.0 {
        weighted / total
    } else {
        CONFIGURED_CONFIDENCE
    }
}

fn skip(warnings: &mut Vec<Warning>, item_id: &str, reason: String) {
    warn!("Skipping '{}': {}", item_id, reason);
    warnings.push(Warning::SkippedItem {
        item_id: item_id.to_string(),
        reason,
    });
}

fn usable_items<'a>(items: &'a [RecurringItem], warnings: &mut Vec<Warning>) -> Vec<&'a RecurringItem> {
    items
        .iter()
        .filter(|item| match item.validate() {
            Ok(()) => true,
            Err(e) => {
                skip(warnings, &item.id, e.to_string());
                false
            }
        })
        .collect()
}

fn usable_one_time<'a>(
    expenses: &'a [OneTimeExpense],
    warnings: &mut Vec<Warning>,
) -> Vec<&'a OneTimeExpense> {
    expenses
        .iter()
        .filter(|e| {
            if e.amount.is_finite() && e.amount >= 0.0 {
                true
            } else {
                skip(warnings, &e.id, format!("invalid amount {}", e.amount));
                false
            }
        })
        .collect()
}

fn usable_goals<'a>(goals: &'a [SavingsGoal], warnings: &mut Vec<Warning>) -> Vec<&'a SavingsGoal> {
    goals
        .iter()
        .filter(|g| {
            let valid = [g.target_amount, g.current_amount, g.monthly_contribution]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0);
            if !valid {
                skip(warnings, &g.id, "negative or non-finite amount".to_string());
            }
            valid
        })
        .collect()
}

fn usable_assets(assets: &[Asset], warnings: &mut Vec<Warning>) -> Vec<Asset> {
    assets
        .iter()
        .filter(|a| match a.validate() {
            Ok(()) => true,
            Err(e) => {
                skip(warnings, &a.id, e.to_string());
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, PatternFrequency};
    use crate::test_utils::{date, expense, month, monthly_item};

    fn basic_config() -> FinancialConfiguration {
        FinancialConfiguration {
            income_sources: vec![monthly_item("salary", 2800.0, "2024-01-01", "income")],
            recurring_expenses: vec![monthly_item("rent", 1000.0, "2024-01-01", "rent")],
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_projection_scenario() {
        let engine = ProjectionEngine::new(date("2024-01-15"));
        let report = engine.project(&basic_config(), &[], &[], 3);

        assert_eq!(report.balances(), vec![1800.0, 3600.0, 5400.0]);
        assert_eq!(report.months[0].month, month("2024-01"));
        assert_eq!(report.months[2].month, month("2024-03"));
        assert!(report.months.iter().all(|m| m.confidence == 100.0));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_starting_balance_seeds_series() {
        let mut config = basic_config();
        config.starting_balance = 500.0;
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 2);
        assert_eq!(report.balances(), vec![2300.0, 4100.0]);
    }

    #[test]
    fn test_zero_months_is_empty() {
        let report = ProjectionEngine::new(date("2024-01-15")).project(&basic_config(), &[], &[], 0);
        assert!(report.months.is_empty());
        assert_eq!(report.final_balance(), None);

        let mut config = basic_config();
        config.income_sources[0].amount = -1.0;
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 0);
        assert!(report.months.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_actuals_only_for_started_months() {
        let engine = ProjectionEngine::new(date("2024-01-15"));
        let txs = vec![
            Transaction::new("t1", "Salary", 2800.0, date("2024-01-02")),
            expense("Albert Heijn", 60.0, "2024-01-05"),
            expense("Albert Heijn", 40.0, "2024-01-12"),
            expense("Last year", 99.0, "2023-12-30"),
        ];
        let report = engine.project(&basic_config(), &txs, &[], 2);

        assert_eq!(report.months[0].actual_income, Some(2800.0));
        assert_eq!(report.months[0].actual_expenses, Some(100.0));
        assert_eq!(report.months[1].actual_income, None);
        assert_eq!(report.months[1].actual_expenses, None);
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let mut config = basic_config();
        let mut broken = monthly_item("broken", 50.0, "2024-03-01", "misc");
        broken.end_date = Some(date("2024-01-01"));
        config.recurring_expenses.push(broken);
        let mut negative = monthly_item("negative", -10.0, "2024-01-01", "misc");
        negative.frequency = Frequency::Weekly;
        config.income_sources.push(negative);

        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 3);
        assert_eq!(report.months.len(), 3);
        assert_eq!(report.balances(), vec![1800.0, 3600.0, 5400.0]);
        assert_eq!(report.warnings.len(), 2);
        assert!(report
            .warnings
            .iter()
            .all(|w| matches!(w, Warning::SkippedItem { .. })));
    }

    #[test]
    fn test_yearly_item_lands_in_anniversary_month() {
        let mut config = basic_config();
        config.recurring_expenses.push(RecurringItem::new(
            "tax",
            "Car tax",
            1200.0,
            Frequency::Yearly,
            date("2023-02-10"),
            "transport",
        ));
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 3);
        assert_eq!(report.months[0].configured_expenses, 1000.0);
        assert_eq!(report.months[1].configured_expenses, 2200.0);
        assert_eq!(report.months[2].configured_expenses, 1000.0);
    }

    #[test]
    fn test_one_time_expense_in_its_month() {
        let mut config = basic_config();
        config.one_time_expenses.push(OneTimeExpense {
            id: "laptop".to_string(),
            name: "New laptop".to_string(),
            amount: 1500.0,
            date: date("2024-02-20"),
            category: "shopping".to_string(),
        });
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 3);
        assert_eq!(report.balances(), vec![1800.0, 2100.0, 3900.0]);
        assert!(report.months[1]
            .expense_breakdown
            .iter()
            .any(|l| l.source == LineSource::OneTime));
    }

    #[test]
    fn test_savings_goal_stops_at_target() {
        let mut config = basic_config();
        config.savings_goals.push(SavingsGoal {
            id: "buffer".to_string(),
            name: "Emergency fund".to_string(),
            target_amount: 1000.0,
            current_amount: 600.0,
            monthly_contribution: 300.0,
            target_date: None,
        });
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 3);
        let saved: Vec<f64> = report
            .months
            .iter()
            .map(|m| {
                m.expense_breakdown
                    .iter()
                    .filter(|l| l.category == SAVINGS_CATEGORY)
                    .map(|l| l.amount)
                    .sum()
            })
            .collect();
        assert_eq!(saved, vec![300.0, 100.0, 0.0]);
    }

    #[test]
    fn test_savings_goal_stops_after_target_date() {
        let mut config = basic_config();
        config.savings_goals.push(SavingsGoal {
            id: "trip".to_string(),
            name: "Trip".to_string(),
            target_amount: 10_000.0,
            current_amount: 0.0,
            monthly_contribution: 200.0,
            target_date: Some(date("2024-02-01")),
        });
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[], 3);
        assert_eq!(report.balances(), vec![1600.0, 3200.0, 5000.0]);
    }

    #[test]
    fn test_debt_payments_are_expense_lines() {
        let debt = Debt::new("card", "Credit card", 250.0, 0.0, Some(100.0), date("2024-01-01"));
        let report =
            ProjectionEngine::new(date("2024-01-15")).project(&basic_config(), &[], &[debt], 4);

        let payments: Vec<f64> = report
            .months
            .iter()
            .map(|m| {
                m.expense_breakdown
                    .iter()
                    .filter(|l| l.source == LineSource::DebtPayment)
                    .map(|l| l.amount)
                    .sum()
            })
            .collect();
        assert_eq!(payments, vec![100.0, 100.0, 50.0, 0.0]);
        assert_eq!(report.months[0].debt_balance, 150.0);
        assert_eq!(report.months[2].debt_balance, 0.0);
        assert_eq!(report.final_balance(), Some(1800.0 * 4.0 - 250.0));
    }

    #[test]
    fn test_payment_too_low_is_warned_not_fatal() {
        let debt = Debt::new("loan", "Loan", 10_000.0, 12.0, Some(50.0), date("2024-01-01"));
        let report =
            ProjectionEngine::new(date("2024-01-15")).project(&basic_config(), &[], &[debt], 3);
        assert_eq!(report.months.len(), 3);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::PaymentInsufficient { .. })));
        // Reported once, at the top level
        assert!(report.debts.warnings.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_net_worth_includes_assets_and_debts() {
        let mut config = basic_config();
        config.assets.push(Asset {
            id: "house".to_string(),
            name: "House".to_string(),
            current_value: 100_000.0,
            purchase_price: None,
            appreciation_rate: None,
            depreciation_rate: None,
        });
        let debt = Debt::new("m", "Mortgage", 50_000.0, 0.0, Some(500.0), date("2024-01-01"));
        let report = ProjectionEngine::new(date("2024-01-15")).project(&config, &[], &[debt], 1);

        let first = &report.months[0];
        assert_eq!(first.projected_balance, 1300.0);
        assert_eq!(first.asset_value, 100_000.0);
        assert_eq!(first.debt_balance, 49_500.0);
        assert_eq!(first.net_worth, 1300.0 + 100_000.0 - 49_500.0);
    }

    #[test]
    fn test_pattern_blending_lowers_confidence() {
        let patterns = vec![
            ExpensePattern {
                category: "groceries".to_string(),
                average_amount: 200.0,
                frequency: PatternFrequency::Monthly,
                confidence: 0.8,
                last_occurrence: date("2024-01-10"),
                predicted_next_amount: 200.0,
                observations: 4,
            },
            ExpensePattern {
                category: "rent".to_string(),
                average_amount: 999.0,
                frequency: PatternFrequency::Monthly,
                confidence: 0.9,
                last_occurrence: date("2024-01-01"),
                predicted_next_amount: 999.0,
                observations: 4,
            },
        ];
        let engine = ProjectionEngine::new(date("2024-01-15")).with_patterns(patterns);
        let report = engine.project(&basic_config(), &[], &[], 2);

        let first = &report.months[0];
        assert_eq!(first.predicted_expenses, 200.0);
        assert_eq!(first.configured_expenses, 1000.0);
        assert_eq!(first.projected_balance, 1600.0);
        // (2800×100 + 1000×100 + 200×80) / 4000
        assert!((first.confidence - 99.0).abs() < 1e-9);
        assert!(!first
            .expense_breakdown
            .iter()
            .any(|l| l.source == LineSource::Predicted && l.category == "rent"));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let engine = ProjectionEngine::new(date("2024-01-15"));
        let a = engine.project(&basic_config(), &[], &[], 12);
        let b = engine.project(&basic_config(), &[], &[], 12);
        assert_eq!(a.balances(), b.balances());
    }
}
