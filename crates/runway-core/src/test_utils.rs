//! Fixture builders shared by the unit tests

use chrono::NaiveDate;

use crate::models::{Frequency, RecurringItem, Transaction};
use crate::month::YearMonth;

/// Parse a `YYYY-MM-DD` literal
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Parse a `YYYY-MM` literal
pub fn month(s: &str) -> YearMonth {
    s.parse().unwrap()
}

pub fn monthly_item(id: &str, amount: f64, start: &str, category: &str) -> RecurringItem {
    RecurringItem::new(id, id, amount, Frequency::Monthly, date(start), category)
}

pub fn expense(description: &str, amount: f64, on: &str) -> Transaction {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    Transaction::new(
        format!("tx-{}", COUNTER.fetch_add(1, Ordering::SeqCst)),
        description,
        -amount.abs(),
        date(on),
    )
}

/// Expenses of `amount` in `category`, every `every_days` days from `first`
pub fn spaced_expenses(
    category: &str,
    amount: f64,
    first: &str,
    every_days: i64,
    count: usize,
) -> Vec<Transaction> {
    let start = date(first);
    (0..count)
        .map(|i| {
            let on = start + chrono::Duration::days(every_days * i as i64);
            expense(category, amount, &on.format("%Y-%m-%d").to_string()).with_category(category)
        })
        .collect()
}
