//! Spending reports and analytics
//!
//! All functions here are pure: they take the record set plus an anchor
//! date or period and build a fresh result. Zero totals never divide.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    Category, CategoryAmount, CategoryExpense, DailyExpense, Expense, ExpensesByCategory,
    MonthlyReport, MonthlyTrend, ReportState, TodaySummary, YearMonth,
};

/// Length of the rolling window, in calendar days, ending today
pub const WINDOW_DAYS: i64 = 7;

/// Default number of categories kept in a monthly report
pub const DEFAULT_TOP_CATEGORIES: usize = 5;

/// Default number of categories in the "top this month" widget
pub const DEFAULT_MONTH_TOP_CATEGORIES: usize = 3;

/// Report builder
#[derive(Debug, Clone)]
pub struct ReportEngine {
    top_categories: usize,
    month_top_categories: usize,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngine {
    pub fn new() -> Self {
        Self {
            top_categories: DEFAULT_TOP_CATEGORIES,
            month_top_categories: DEFAULT_MONTH_TOP_CATEGORIES,
        }
    }

    pub fn with_limits(top_categories: usize, month_top_categories: usize) -> Self {
        Self {
            top_categories,
            month_top_categories,
        }
    }

    /// Build every report for `period`, with the rolling window ending `today`
    pub fn build(&self, records: &[Expense], period: YearMonth, today: NaiveDate) -> ReportState {
        let daily_series = build_daily_series(records, today);
        let last_7_days_total: Decimal = daily_series.iter().map(|d| d.total_amount).sum();
        let state = ReportState {
            selected_period: period,
            category_series: build_category_series(records, today),
            monthly_report: self.build_monthly_report(records, period),
            daily_series,
            last_7_days_total,
            expenses_by_category: expenses_by_category(records),
            monthly_trends: monthly_trends(records),
            is_loading: false,
            error_message: None,
        };

        debug!(
            records = records.len(),
            period = %period,
            last_7_days_total = %state.last_7_days_total,
            "Recomputed reports"
        );

        state
    }

    /// Monthly aggregate keeping this engine's top-N
    pub fn build_monthly_report(&self, records: &[Expense], period: YearMonth) -> MonthlyReport {
        monthly_report(records, period, self.top_categories)
    }

    /// Highest-spend categories of a month, for the dashboard widget
    pub fn top_categories_for_month(
        &self,
        records: &[Expense],
        period: YearMonth,
    ) -> Vec<CategoryAmount> {
        let mut report = monthly_report(records, period, self.month_top_categories);
        std::mem::take(&mut report.top_categories)
    }
}

/// Seven calendar-day buckets, `today - 6` through `today`, oldest first
///
/// Days without expenses report a zero total and zero count.
pub fn build_daily_series(records: &[Expense], today: NaiveDate) -> Vec<DailyExpense> {
    (0..WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let (total_amount, expense_count) = records
                .iter()
                .filter(|e| e.date() == day)
                .fold((Decimal::ZERO, 0), |(sum, n), e| (sum + e.amount, n + 1));
            DailyExpense {
                date: day,
                total_amount,
                expense_count,
            }
        })
        .collect()
}

/// Per-category totals for the rolling window, largest first
///
/// Percentages are of the window total, or 0 when that total is zero.
pub fn build_category_series(records: &[Expense], today: NaiveDate) -> Vec<CategoryExpense> {
    let window_start = today - Duration::days(WINDOW_DAYS - 1);
    let in_window: Vec<&Expense> = records
        .iter()
        .filter(|e| e.date() >= window_start && e.date() <= today)
        .collect();

    let window_total: Decimal = in_window.iter().map(|e| e.amount).sum();

    let mut series: Vec<CategoryExpense> = sum_by_category(in_window.iter().copied())
        .into_iter()
        .map(|(category, total_amount, expense_count)| CategoryExpense {
            category,
            total_amount,
            percentage: percentage_of(total_amount, window_total),
            expense_count,
        })
        .collect();

    series.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    series
}

/// Monthly aggregate with the default top-5 categories
pub fn build_monthly_report(records: &[Expense], period: YearMonth) -> MonthlyReport {
    monthly_report(records, period, DEFAULT_TOP_CATEGORIES)
}

fn monthly_report(records: &[Expense], period: YearMonth, top_n: usize) -> MonthlyReport {
    let in_period: Vec<&Expense> = records.iter().filter(|e| e.period() == period).collect();

    let total_expenses: Decimal = in_period.iter().map(|e| e.amount).sum();
    let sums = sum_by_category(in_period.iter().copied());

    let category_breakdown: BTreeMap<Category, Decimal> =
        sums.iter().map(|(c, amount, _)| (*c, *amount)).collect();

    let mut top_categories: Vec<CategoryAmount> = sums
        .into_iter()
        .map(|(category, amount, _)| CategoryAmount { category, amount })
        .collect();
    top_categories.sort_by(|a, b| b.amount.cmp(&a.amount));
    top_categories.truncate(top_n);

    let days = period.days_in_month();
    let average_daily = if days > 0 {
        total_expenses / Decimal::from(days)
    } else {
        Decimal::ZERO
    };

    MonthlyReport {
        period,
        total_expenses,
        expense_count: in_period.len(),
        category_breakdown,
        top_categories,
        average_daily,
    }
}

/// Every record grouped by category, groups largest first
pub fn expenses_by_category(records: &[Expense]) -> Vec<ExpensesByCategory> {
    let mut order: Vec<Category> = Vec::new();
    let mut buckets: HashMap<Category, Vec<Expense>> = HashMap::new();
    for expense in records {
        buckets
            .entry(expense.category)
            .or_insert_with(|| {
                order.push(expense.category);
                Vec::new()
            })
            .push(expense.clone());
    }

    let mut groups: Vec<ExpensesByCategory> = order
        .into_iter()
        .filter_map(|category| {
            let mut expenses = buckets.remove(&category)?;
            expenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            let total = expenses.iter().map(|e| e.amount).sum();
            Some(ExpensesByCategory {
                category,
                expenses,
                total,
            })
        })
        .collect();

    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

/// Totals per calendar month, oldest first
pub fn monthly_trends(records: &[Expense]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<YearMonth, (Decimal, usize)> = BTreeMap::new();
    for expense in records {
        let entry = months.entry(expense.period()).or_insert((Decimal::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(month, (total_amount, expense_count))| MonthlyTrend {
            month,
            total_amount,
            expense_count,
        })
        .collect()
}

pub fn today_summary(records: &[Expense], today: NaiveDate) -> TodaySummary {
    records
        .iter()
        .filter(|e| e.date() == today)
        .fold(TodaySummary::default(), |mut acc, e| {
            acc.total_amount += e.amount;
            acc.expense_count += 1;
            acc
        })
}

/// `100 * part / whole` as a finite, non-negative float; 0 when `whole` is zero
pub fn percentage_of(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    let pct = (part / whole * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0);
    if pct.is_finite() && pct > 0.0 {
        pct
    } else {
        0.0
    }
}

/// Sum and count per category, in first-seen order
fn sum_by_category<'a>(
    expenses: impl Iterator<Item = &'a Expense>,
) -> Vec<(Category, Decimal, usize)> {
    let mut sums: Vec<(Category, Decimal, usize)> = Vec::new();
    for expense in expenses {
        match sums.iter_mut().find(|(c, _, _)| *c == expense.category) {
            Some(entry) => {
                entry.1 += expense.amount;
                entry.2 += 1;
            }
            None => sums.push((expense.category, expense.amount, 1)),
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, date, expense, expense_days_ago, money};
    use chrono::NaiveDateTime;

    fn now() -> NaiveDateTime {
        at(2024, 3, 3, 10, 0)
    }

    #[test]
    fn test_daily_series_always_has_seven_days() {
        let series = build_daily_series(&[], now().date());
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, date(2024, 2, 26));
        assert_eq!(series[6].date, date(2024, 3, 3));
        for (i, day) in series.iter().enumerate() {
            assert_eq!(day.total_amount, Decimal::ZERO);
            assert_eq!(day.expense_count, 0);
            if i > 0 {
                assert_eq!(day.date, series[i - 1].date + Duration::days(1));
            }
        }
    }

    #[test]
    fn test_daily_series_buckets_by_calendar_date() {
        let records = vec![
            expense("Breakfast", "5", Category::Food, at(2024, 3, 3, 0, 1)),
            expense("Dinner", "15", Category::Food, at(2024, 3, 3, 23, 59)),
            expense("Feb 29", "7", Category::Food, at(2024, 2, 29, 12, 0)),
            expense("Too old", "100", Category::Food, at(2024, 2, 25, 23, 59)),
            expense("Tomorrow", "100", Category::Food, at(2024, 3, 4, 0, 0)),
        ];
        let series = build_daily_series(&records, now().date());

        assert_eq!(series[6].total_amount, money("20"));
        assert_eq!(series[6].expense_count, 2);
        assert_eq!(series[3].date, date(2024, 2, 29));
        assert_eq!(series[3].total_amount, money("7"));

        let total: Decimal = series.iter().map(|d| d.total_amount).sum();
        assert_eq!(total, money("27"));
    }

    #[test]
    fn test_category_series_percentages() {
        let records = vec![
            expense_days_ago("Meals", "100", Category::Food, now(), 2),
            expense_days_ago("Flight", "300", Category::Travel, now(), 5),
            expense_days_ago("Old flight", "999", Category::Travel, now(), 7),
        ];
        let series = build_category_series(&records, now().date());

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].category, Category::Travel);
        assert_eq!(series[0].total_amount, money("300"));
        assert!((series[0].percentage - 75.0).abs() < 1e-9);
        assert_eq!(series[1].category, Category::Food);
        assert!((series[1].percentage - 25.0).abs() < 1e-9);

        let state = ReportEngine::new().build(&records, YearMonth::from_date(now().date()), now().date());
        assert_eq!(state.last_7_days_total, money("400"));
    }

    #[test]
    fn test_category_percentages_sum_to_hundred() {
        let records = vec![
            expense_days_ago("A", "10", Category::Food, now(), 0),
            expense_days_ago("B", "10", Category::Travel, now(), 1),
            expense_days_ago("C", "10", Category::Staff, now(), 2),
        ];
        let series = build_category_series(&records, now().date());
        let sum: f64 = series.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
        assert!(series.iter().all(|c| c.percentage.is_finite() && c.percentage >= 0.0));
    }

    #[test]
    fn test_category_series_empty_window() {
        let records = vec![expense_days_ago("Old", "50", Category::Food, now(), 30)];
        assert!(build_category_series(&records, now().date()).is_empty());
    }

    #[test]
    fn test_percentage_of_zero_total() {
        assert_eq!(percentage_of(Decimal::ZERO, Decimal::ZERO), 0.0);
        assert_eq!(percentage_of(money("5"), Decimal::ZERO), 0.0);
        assert_eq!(percentage_of(money("1"), money("4")), 25.0);
    }

    #[test]
    fn test_monthly_report() {
        let records = vec![
            expense("Salary", "500", Category::Staff, at(2024, 2, 1, 9, 0)),
            expense("Hotel", "200", Category::Travel, at(2024, 2, 10, 9, 0)),
            expense("Lunch", "40", Category::Food, at(2024, 2, 29, 13, 0)),
            expense("Dinner", "40", Category::Food, at(2024, 2, 15, 19, 0)),
            expense("March", "1000", Category::Food, at(2024, 3, 1, 0, 0)),
        ];
        let report = build_monthly_report(&records, YearMonth::new(2024, 2).unwrap());

        assert_eq!(report.total_expenses, money("780"));
        assert_eq!(report.expense_count, 4);
        assert_eq!(report.category_breakdown.len(), 3);
        assert_eq!(report.category_breakdown[&Category::Food], money("80"));
        let top: Vec<Category> = report.top_categories.iter().map(|c| c.category).collect();
        assert_eq!(top, vec![Category::Staff, Category::Travel, Category::Food]);
        // 780 / 29 days in a leap February
        assert_eq!(report.average_daily, money("780") / Decimal::from(29));
    }

    #[test]
    fn test_monthly_report_keeps_top_five() {
        let categories = [
            Category::Staff,
            Category::Travel,
            Category::Food,
            Category::Utility,
            Category::Shopping,
            Category::Other,
        ];
        let records: Vec<Expense> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                expense("x", &format!("{}", (i + 1) * 10), *c, at(2024, 1, 5, 12, 0))
            })
            .collect();
        let report = build_monthly_report(&records, YearMonth::new(2024, 1).unwrap());
        assert_eq!(report.top_categories.len(), 5);
        assert_eq!(report.top_categories[0].category, Category::Other);
        assert_eq!(report.category_breakdown.len(), 6);
    }

    #[test]
    fn test_monthly_report_malformed_period() {
        let records = vec![expense("x", "10", Category::Food, now())];
        let report = build_monthly_report(&records, YearMonth { year: 2024, month: 0 });
        assert_eq!(report.total_expenses, Decimal::ZERO);
        assert_eq!(report.average_daily, Decimal::ZERO);
    }

    #[test]
    fn test_top_categories_for_month() {
        let records = vec![
            expense("a", "10", Category::Food, at(2024, 3, 1, 9, 0)),
            expense("b", "30", Category::Travel, at(2024, 3, 2, 9, 0)),
            expense("c", "20", Category::Staff, at(2024, 3, 2, 9, 0)),
            expense("d", "5", Category::Utility, at(2024, 3, 3, 9, 0)),
        ];
        let top = ReportEngine::new().top_categories_for_month(&records, YearMonth::new(2024, 3).unwrap());
        let cats: Vec<Category> = top.iter().map(|c| c.category).collect();
        assert_eq!(cats, vec![Category::Travel, Category::Staff, Category::Food]);
    }

    #[test]
    fn test_expenses_by_category_and_trends() {
        let records = vec![
            expense("a", "10", Category::Food, at(2024, 1, 1, 9, 0)),
            expense("b", "30", Category::Travel, at(2024, 2, 2, 9, 0)),
            expense("c", "25", Category::Food, at(2024, 2, 3, 9, 0)),
        ];

        let groups = expenses_by_category(&records);
        assert_eq!(groups[0].category, Category::Food);
        assert_eq!(groups[0].total, money("35"));
        assert_eq!(groups[0].expenses[0].title, "c");

        let trends = monthly_trends(&records);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].month, YearMonth::new(2024, 1).unwrap());
        assert_eq!(trends[1].total_amount, money("55"));
        assert_eq!(trends[1].expense_count, 2);
    }

    #[test]
    fn test_today_summary() {
        let records = vec![
            expense_days_ago("a", "10.25", Category::Food, now(), 0),
            expense_days_ago("b", "4.75", Category::Food, now(), 0),
            expense_days_ago("c", "99", Category::Food, now(), 1),
        ];
        let summary = today_summary(&records, now().date());
        assert_eq!(summary.total_amount, money("15.00"));
        assert_eq!(summary.expense_count, 2);
    }
}
