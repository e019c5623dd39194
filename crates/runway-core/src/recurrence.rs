//! Recurrence resolution
//!
//! Decides whether a recurring item contributes to a calendar month and how
//! much. The conversion factors are approximations of calendar averages and
//! are shown to users verbatim, so they must not change:
//!
//! | frequency | monthly equivalent |
//! |-----------|--------------------|
//! | weekly    | amount × 4.33      |
//! | biweekly  | amount × 2.17      |
//! | monthly   | amount             |
//! | quarterly | amount ÷ 3         |
//! | yearly    | amount ÷ 12        |
//!
//! The factors are fixed per month; a month with five paydays still gets
//! 4.33 weekly occurrences.

use crate::models::{Frequency, RecurringItem};
use crate::month::YearMonth;

pub const WEEKLY_FACTOR: f64 = 4.33;
pub const BIWEEKLY_FACTOR: f64 = 2.17;

/// Convert an amount in the item's native unit to a per-month amount
pub fn monthly_equivalent(amount: f64, frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => amount * WEEKLY_FACTOR,
        Frequency::Biweekly => amount * BIWEEKLY_FACTOR,
        Frequency::Monthly => amount,
        Frequency::Quarterly => amount / 3.0,
        Frequency::Yearly => amount / 12.0,
    }
}

/// How many native periods fall into one month on average
pub fn occurrences_per_month(frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => WEEKLY_FACTOR,
        Frequency::Biweekly => BIWEEKLY_FACTOR,
        Frequency::Monthly => 1.0,
        Frequency::Quarterly => 1.0 / 3.0,
        Frequency::Yearly => 1.0 / 12.0,
    }
}

/// Whether `item` contributes anything to `target`.
///
/// Month granularity: an item starting on the 20th still occurs in its start
/// month, and an item ending on the 3rd still occurs in its end month.
/// Yearly items occur only in their anniversary month. Inactive items never
/// occur.
pub fn occurs_in_month(item: &RecurringItem, target: YearMonth) -> bool {
    if !item.is_active {
        return false;
    }
    let start = YearMonth::from_date(item.start_date);
    if target < start {
        return false;
    }
    if let Some(end) = item.end_date {
        if target > YearMonth::from_date(end) {
            return false;
        }
    }
    match item.frequency {
        Frequency::Yearly => target.month() == start.month(),
        _ => true,
    }
}

/// The amount `item` contributes to `target`, or 0 when it does not occur.
///
/// Yearly items land in full in their anniversary month; every other
/// frequency contributes its monthly equivalent.
pub fn amount_in_month(item: &RecurringItem, target: YearMonth) -> f64 {
    if !occurs_in_month(item, target) {
        return 0.0;
    }
    match item.frequency {
        Frequency::Yearly => item.amount,
        frequency => monthly_equivalent(item.amount, frequency),
    }
}
