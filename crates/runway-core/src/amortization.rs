//! Debt amortization simulator
//!
//! Steps each debt forward one calendar month at a time from the reference
//! month. A debt is in one of four states per month:
//!
//! - **BeforeStart** - balance frozen, no interest, no payment
//! - **Active** - interest accrues, then the payment is applied
//! - **PaidOff** - balance reached zero, nothing further happens
//! - **Matured** - the end date has been reached; the remaining balance is
//!   forgiven instead of paid
//!
//! A no-payment counterfactual (interest-only compounding) runs alongside so
//! the schedule can report `forgiveness = max(0, no_payment_balance - total_paid)`:
//! what the borrower saves if the debt is forgiven before it is repaid.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Warning;
use crate::models::Debt;
use crate::month::YearMonth;

/// Hard cap on simulated months (100 years)
pub const MAX_HORIZON_MONTHS: u32 = 1200;

/// Balances below this are treated as fully repaid
const BALANCE_EPSILON: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtState {
    BeforeStart,
    Active,
    PaidOff,
    Matured,
}

/// Resolution of a simulated time series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Monthly,
    Yearly,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!(
                "Unknown granularity: {} (valid: monthly, yearly)",
                s
            )),
        }
    }
}

/// One simulated month of a single debt
#[derive(Debug, Clone, Serialize)]
pub struct AmortizationPoint {
    pub month: YearMonth,
    pub state: DebtState,
    /// Balance after this month's interest and payment
    pub balance: f64,
    pub interest_portion: f64,
    pub principal_portion: f64,
    pub payment_applied: f64,
    /// Cumulative payments up to and including this month
    pub total_paid: f64,
    pub total_interest: f64,
    /// Balance had no payment ever been made
    pub no_payment_balance: f64,
    pub forgiveness: f64,
}

/// Terminal figures of a single debt's simulation
#[derive(Debug, Clone, Serialize)]
pub struct DebtSummary {
    pub debt_id: String,
    pub debt_name: String,
    pub total_paid: f64,
    pub total_interest: f64,
    /// Balance left when the simulation stopped, before any forgiveness
    pub final_balance: f64,
    pub was_forgiven: bool,
    pub forgiven_amount: f64,
    pub payoff_month: Option<YearMonth>,
    pub maturity_month: Option<YearMonth>,
    /// The payment never reduced principal in at least one active month
    pub payment_too_low: bool,
    pub months_simulated: usize,
}

/// Full simulation result for one debt
#[derive(Debug, Clone, Serialize)]
pub struct DebtSchedule {
    pub points: Vec<AmortizationPoint>,
    pub summary: DebtSummary,
    #[serde(skip)]
    opening_balance: f64,
}

impl DebtSchedule {
    /// Payment applied in `month`, 0 outside the active period
    pub fn payment_for(&self, month: YearMonth) -> f64 {
        self.point_for(month).map_or(0.0, |p| p.payment_applied)
    }

    /// Outstanding balance at the end of `month`.
    ///
    /// Months before the simulation window report the opening balance; months
    /// after a payoff or maturity report zero.
    pub fn balance_for(&self, month: YearMonth) -> f64 {
        if let Some(point) = self.point_for(month) {
            return match point.state {
                DebtState::Matured | DebtState::PaidOff => 0.0,
                _ => point.balance,
            };
        }
        match (self.points.first(), self.points.last()) {
            (Some(first), _) if month < first.month => self.opening_balance,
            (_, Some(last)) => match last.state {
                DebtState::Matured | DebtState::PaidOff => 0.0,
                _ => last.balance,
            },
            _ => self.opening_balance,
        }
    }

    pub fn point_for(&self, month: YearMonth) -> Option<&AmortizationPoint> {
        let first = self.points.first()?;
        let offset = first.month.months_until(month);
        if offset < 0 {
            return None;
        }
        self.points.get(offset as usize)
    }

    /// The time series at the requested resolution.
    ///
    /// Yearly keeps every twelfth point from the first and always the last.
    pub fn series(&self, granularity: Granularity) -> Vec<AmortizationPoint> {
        match granularity {
            Granularity::Monthly => self.points.clone(),
            Granularity::Yearly => downsample_yearly(&self.points),
        }
    }
}

fn downsample_yearly<T: Clone>(points: &[T]) -> Vec<T> {
    let mut sampled: Vec<T> = points.iter().step_by(12).cloned().collect();
    if !points.is_empty() && (points.len() - 1) % 12 != 0 {
        if let Some(last) = points.last() {
            sampled.push(last.clone());
        }
    }
    sampled
}

/// Sum of all simulated debts in one month
#[derive(Debug, Clone, Serialize)]
pub struct AggregatePoint {
    pub month: YearMonth,
    pub balance: f64,
    pub interest: f64,
    pub payment: f64,
    pub total_paid: f64,
    pub forgiveness: f64,
}

/// Result of simulating a set of debts together
#[derive(Debug, Clone, Serialize)]
pub struct DebtReport {
    pub schedules: Vec<DebtSchedule>,
    pub aggregate: Vec<AggregatePoint>,
    pub warnings: Vec<Warning>,
}

impl DebtReport {
    pub fn total_paid(&self) -> f64 {
        self.schedules.iter().map(|s| s.summary.total_paid).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.schedules.iter().map(|s| s.summary.total_interest).sum()
    }

    pub fn total_forgiven(&self) -> f64 {
        self.schedules.iter().map(|s| s.summary.forgiven_amount).sum()
    }

    /// Aggregate series at the requested resolution
    pub fn aggregate_series(&self, granularity: Granularity) -> Vec<AggregatePoint> {
        match granularity {
            Granularity::Monthly => self.aggregate.clone(),
            Granularity::Yearly => downsample_yearly(&self.aggregate),
        }
    }
}

/// Simulates debts month by month from a reference date
#[derive(Debug, Clone)]
pub struct DebtSimulator {
    today: YearMonth,
    horizon_months: u32,
}

impl DebtSimulator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: YearMonth::from_date(today),
            horizon_months: MAX_HORIZON_MONTHS,
        }
    }

    /// Limit the number of simulated months (capped at 100 years)
    pub fn with_horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = months.min(MAX_HORIZON_MONTHS);
        self
    }

    /// Simulate a single debt from its current snapshot.
    ///
    /// Never fails: a payment that does not cover interest is flagged in the
    /// summary and the balance is allowed to grow.
    pub fn simulate(&self, debt: &Debt) -> DebtSchedule {
        let start = YearMonth::from_date(debt.start_date);
        let maturity = debt.end_date.map(YearMonth::from_date);
        let payment = debt.monthly_payment.unwrap_or(0.0);
        let monthly_rate = debt.interest_rate / 100.0 / 12.0;

        let mut balance = debt.current_balance;
        let mut no_payment_balance = debt.current_balance;
        let mut total_paid = 0.0;
        let mut total_interest = 0.0;
        let mut payment_too_low = false;
        let mut payoff_month = None;
        let mut was_forgiven = false;
        let mut forgiven_amount = 0.0;
        let mut points = Vec::new();

        for offset in 0..self.horizon_months {
            let month = self.today.add_months(offset as i32);
            let state = if maturity.is_some_and(|m| month >= m) {
                DebtState::Matured
            } else if month < start {
                DebtState::BeforeStart
            } else if balance <= BALANCE_EPSILON {
                DebtState::PaidOff
            } else {
                DebtState::Active
            };

            let forgiveness = (no_payment_balance - total_paid).max(0.0);
            match state {
                DebtState::BeforeStart => {
                    points.push(AmortizationPoint {
                        month,
                        state,
                        balance,
                        interest_portion: 0.0,
                        principal_portion: 0.0,
                        payment_applied: 0.0,
                        total_paid,
                        total_interest,
                        no_payment_balance,
                        forgiveness,
                    });
                }
                DebtState::Matured => {
                    was_forgiven = balance > BALANCE_EPSILON;
                    forgiven_amount = if was_forgiven { balance } else { 0.0 };
                    points.push(AmortizationPoint {
                        month,
                        state,
                        balance,
                        interest_portion: 0.0,
                        principal_portion: 0.0,
                        payment_applied: 0.0,
                        total_paid,
                        total_interest,
                        no_payment_balance,
                        forgiveness,
                    });
                    break;
                }
                DebtState::PaidOff => {
                    points.push(AmortizationPoint {
                        month,
                        state,
                        balance: 0.0,
                        interest_portion: 0.0,
                        principal_portion: 0.0,
                        payment_applied: 0.0,
                        total_paid,
                        total_interest,
                        no_payment_balance,
                        forgiveness,
                    });
                    break;
                }
                DebtState::Active => {
                    let interest = balance * monthly_rate;
                    no_payment_balance += no_payment_balance * monthly_rate;

                    if payment <= interest {
                        payment_too_low = true;
                    }

                    let due = balance + interest;
                    let applied = payment.min(due);
                    balance = (due - applied).max(0.0);
                    total_paid += applied;
                    total_interest += interest;

                    if balance <= BALANCE_EPSILON {
                        balance = 0.0;
                        payoff_month = Some(month);
                    }

                    points.push(AmortizationPoint {
                        month,
                        state,
                        balance,
                        interest_portion: interest,
                        principal_portion: applied - interest,
                        payment_applied: applied,
                        total_paid,
                        total_interest,
                        no_payment_balance,
                        forgiveness: (no_payment_balance - total_paid).max(0.0),
                    });
                }
            }
        }

        if payment_too_low {
            debug!(
                "Debt '{}' payment {:.2} never reduces principal",
                debt.name, payment
            );
        }

        let summary = DebtSummary {
            debt_id: debt.id.clone(),
            debt_name: debt.name.clone(),
            total_paid,
            total_interest,
            final_balance: balance,
            was_forgiven,
            forgiven_amount,
            payoff_month,
            maturity_month: maturity,
            payment_too_low,
            months_simulated: points.len(),
        };

        DebtSchedule {
            points,
            summary,
            opening_balance: debt.current_balance,
        }
    }

    /// Simulate every active debt and aggregate them month by month.
    ///
    /// Malformed debts are skipped with a warning; payments that do not cover
    /// interest are reported as warnings but still simulated.
    pub fn simulate_all(&self, debts: &[Debt]) -> DebtReport {
        let mut schedules = Vec::new();
        let mut warnings = Vec::new();

        for debt in debts {
            if !debt.is_active {
                debug!("Skipping inactive debt '{}'", debt.name);
                continue;
            }
            if let Err(e) = debt.validate() {
                warn!("Skipping debt '{}': {}", debt.id, e);
                warnings.push(Warning::SkippedItem {
                    item_id: debt.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }

            let schedule = self.simulate(debt);
            if schedule.summary.payment_too_low {
                let monthly_interest = debt.current_balance * debt.interest_rate / 100.0 / 12.0;
                warn!(
                    "Debt '{}' payment does not cover {:.2} monthly interest",
                    debt.name, monthly_interest
                );
                warnings.push(Warning::PaymentInsufficient {
                    debt_id: debt.id.clone(),
                    debt_name: debt.name.clone(),
                    monthly_payment: debt.monthly_payment.unwrap_or(0.0),
                    monthly_interest,
                });
            }
            schedules.push(schedule);
        }

        let aggregate = aggregate(&schedules);
        DebtReport {
            schedules,
            aggregate,
            warnings,
        }
    }
}

/// Sum balances, payments and forgiveness across schedules month by month.
///
/// Each schedule keeps its own horizon: once a debt is paid off or matured it
/// contributes no balance, interest or payment, but its cumulative totals
/// carry forward.
pub fn aggregate(schedules: &[DebtSchedule]) -> Vec<AggregatePoint> {
    let mut by_month: BTreeMap<YearMonth, AggregatePoint> = BTreeMap::new();
    let last_month = schedules
        .iter()
        .filter_map(|s| s.points.last().map(|p| p.month))
        .max();
    let Some(last_month) = last_month else {
        return Vec::new();
    };

    for schedule in schedules {
        let Some(first) = schedule.points.first() else {
            continue;
        };
        let mut month = first.month;
        let mut carried: Option<&AmortizationPoint> = None;
        while month <= last_month {
            let entry = by_month.entry(month).or_insert_with(|| AggregatePoint {
                month,
                balance: 0.0,
                interest: 0.0,
                payment: 0.0,
                total_paid: 0.0,
                forgiveness: 0.0,
            });
            match schedule.point_for(month) {
                Some(point) => {
                    if !matches!(point.state, DebtState::Matured | DebtState::PaidOff) {
                        entry.balance += point.balance;
                    }
                    entry.interest += point.interest_portion;
                    entry.payment += point.payment_applied;
                    entry.total_paid += point.total_paid;
                    entry.forgiveness += point.forgiveness;
                    carried = Some(point);
                }
                None => {
                    if let Some(last) = carried {
                        entry.total_paid += last.total_paid;
                        entry.forgiveness += last.forgiveness;
                    }
                }
            }
            month = month.succ();
        }
    }

    by_month.into_values().collect()
}
