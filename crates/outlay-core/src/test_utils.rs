//! Test utilities for outlay-core
//!
//! Builders for timestamps, amounts and expenses so tests read like the
//! scenarios they describe.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::models::{Category, Expense};

/// Build a local timestamp
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Parse an exact amount, e.g. `money("25.50")`
pub fn money(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Build an expense with a generated id
pub fn expense(title: &str, amount: &str, category: Category, timestamp: NaiveDateTime) -> Expense {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Expense {
        id: format!("exp-{}", COUNTER.fetch_add(1, Ordering::SeqCst)),
        title: title.to_string(),
        amount: money(amount),
        category,
        description: None,
        timestamp,
        is_recurring: false,
        receipt_ref: None,
    }
}

/// Same as `expense`, placed `days_ago` days before `now` at the same time
pub fn expense_days_ago(
    title: &str,
    amount: &str,
    category: Category,
    now: NaiveDateTime,
    days_ago: i64,
) -> Expense {
    expense(title, amount, category, now - Duration::days(days_ago))
}

pub fn with_description(mut expense: Expense, description: &str) -> Expense {
    expense.description = Some(description.to_string());
    expense
}
