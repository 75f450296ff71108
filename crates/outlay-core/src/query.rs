//! Query engine for the expense list
//!
//! Turns the current record set plus a filter tuple into a `ViewState`.
//! Stages run in a fixed order, each narrowing the previous one:
//! search, category, date, then a stable newest-first sort, then grouping.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    Category, DateFilter, Expense, ExpenseGroup, FilterState, GroupBy, ViewState, YearMonth,
};

/// Label of the single bucket produced by `GroupBy::None`
pub const ALL_EXPENSES_LABEL: &str = "All Expenses";

/// Pure list recompute
#[derive(Debug, Clone)]
pub struct QueryEngine {
    all_expenses_label: String,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::with_label(ALL_EXPENSES_LABEL)
    }

    /// Use a different label for the ungrouped bucket
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            all_expenses_label: label.into(),
        }
    }

    /// Compute the list state for `records` under `filter`
    ///
    /// `now` anchors the relative date filters. Never fails; an empty
    /// input yields zero totals and an empty list.
    pub fn recompute(
        &self,
        records: &[Expense],
        filter: &FilterState,
        now: NaiveDateTime,
    ) -> ViewState {
        // a blank query is no filter; otherwise match the query as typed
        let query = if filter.search_query.trim().is_empty() {
            String::new()
        } else {
            filter.search_query.to_lowercase()
        };
        let bounds = date_bounds(filter, now.date());

        let mut expenses: Vec<Expense> = records
            .iter()
            .filter(|e| matches_search(e, &query))
            .filter(|e| matches_category(e, filter.category))
            .filter(|e| bounds.map_or(true, |(from, to)| in_range(e.date(), from, to)))
            .cloned()
            .collect();

        // sort_by is stable: equal timestamps keep store order
        expenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total_amount: Decimal = expenses.iter().map(|e| e.amount).sum();
        let expense_count = expenses.len();
        let grouped_expenses = group_expenses(&expenses, filter.group_by, &self.all_expenses_label);

        debug!(
            records = records.len(),
            matched = expense_count,
            groups = grouped_expenses.len(),
            date_filter = filter.date_filter.as_str(),
            group_by = filter.group_by.as_str(),
            "Recomputed expense view"
        );

        ViewState {
            filter: filter.clone(),
            expenses,
            total_amount,
            expense_count,
            grouped_expenses,
            is_loading: false,
            error_message: None,
        }
    }
}

/// Inclusive date bounds for the filter, or `None` when dates are unrestricted
///
/// A custom range with either bound missing applies no restriction.
pub fn date_bounds(filter: &FilterState, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match filter.date_filter {
        DateFilter::Today => Some((today, today)),
        DateFilter::ThisWeek => {
            let monday =
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            Some((monday, monday + Duration::days(6)))
        }
        DateFilter::ThisMonth => {
            let month = YearMonth::from_date(today);
            Some((month.first_day()?, month.last_day()?))
        }
        DateFilter::CustomRange => match (filter.custom_start, filter.custom_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        },
        DateFilter::AllTime => None,
    }
}

fn in_range(date: NaiveDate, from: NaiveDate, to: NaiveDate) -> bool {
    date >= from && date <= to
}

/// `query` must already be trimmed and lowercased; empty matches everything
fn matches_search(expense: &Expense, query: &str) -> bool {
    query.is_empty()
        || expense.title.to_lowercase().contains(query)
        || expense.description_text().to_lowercase().contains(query)
}

fn matches_category(expense: &Expense, category: Option<Category>) -> bool {
    category.map_or(true, |c| expense.category.id() == c.id())
}

/// Bucket an already sorted list without changing membership or order
///
/// Groups appear in the order their first member appears.
pub fn group_expenses(sorted: &[Expense], group_by: GroupBy, all_label: &str) -> Vec<ExpenseGroup> {
    let key: fn(&Expense) -> String = match group_by {
        GroupBy::None => {
            return vec![ExpenseGroup {
                label: all_label.to_string(),
                expenses: sorted.to_vec(),
            }]
        }
        GroupBy::Category => |e| e.category.display_name().to_string(),
        GroupBy::Time => |e| e.date().format("%Y-%m-%d").to_string(),
    };

    let mut groups: Vec<ExpenseGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for expense in sorted {
        let label = key(expense);
        match index.get(&label) {
            Some(&i) => groups[i].expenses.push(expense.clone()),
            None => {
                index.insert(label.clone(), groups.len());
                groups.push(ExpenseGroup {
                    label,
                    expenses: vec![expense.clone()],
                });
            }
        }
    }

    groups
}
