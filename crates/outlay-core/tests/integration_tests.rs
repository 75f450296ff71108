//! Integration tests for outlay-core
//!
//! These tests drive the live feeds over an in-memory store: write through
//! the service, then observe the recomputed list and report states.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tokio::sync::watch;

use outlay_core::{
    AddOutcome, Category, DateFilter, DuplicateGuard, Expense, ExpenseService, ExpenseStore,
    FilterState, FixedClock, GroupBy, InsertMode, MemoryStore, NewExpense, QueryEngine,
    ReportEngine, ReportFeed, ViewFeed, YearMonth,
};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn money(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn record(id: &str, title: &str, amount: &str, category: Category, timestamp: NaiveDateTime) -> Expense {
    Expense {
        id: id.to_string(),
        title: title.to_string(),
        amount: money(amount),
        category,
        description: None,
        timestamp,
        is_recurring: false,
        receipt_ref: None,
    }
}

/// Thursday evening; the week started on Monday June 10
fn now() -> NaiveDateTime {
    at(2024, 6, 13, 18)
}

fn week_records() -> Vec<Expense> {
    vec![
        record("a", "Lunch", "25", Category::Food, at(2024, 6, 13, 12)),
        record("b", "Train", "45", Category::Travel, at(2024, 6, 12, 8)),
        record("c", "Groceries", "85", Category::Food, at(2024, 6, 10, 19)),
    ]
}

/// Wait (bounded) for the first published state matching `pred`
async fn wait_until<T: Clone>(rx: &mut watch::Receiver<T>, pred: impl FnMut(&T) -> bool) -> T {
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("feed stopped");
    T::clone(&state)
}

// =============================================================================
// List feed
// =============================================================================

#[tokio::test]
async fn test_week_grouped_by_category() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let filter = FilterState::new()
        .date_filter(DateFilter::ThisWeek)
        .group_by(GroupBy::Category);

    let feed = ViewFeed::spawn(&store, QueryEngine::new(), clock, filter);
    let mut rx = feed.subscribe();
    let state = wait_until(&mut rx, |s| !s.is_loading).await;

    assert_eq!(state.total_amount, money("155"));
    assert_eq!(state.expense_count, 3);
    assert_eq!(state.grouped_expenses.len(), 2);

    let food = state.group("Food").unwrap();
    assert_eq!(food.expenses.len(), 2);
    assert_eq!(food.total(), money("110"));
    assert_eq!(state.group("Travel").unwrap().total(), money("45"));
}

#[tokio::test]
async fn test_filter_change_recomputes() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(
        &store,
        QueryEngine::new(),
        clock,
        FilterState::new().date_filter(DateFilter::AllTime),
    );
    let mut rx = feed.subscribe();
    wait_until(&mut rx, |s| !s.is_loading).await;

    feed.set_category(Some(Category::Food));
    let state = wait_until(&mut rx, |s| s.filter.category == Some(Category::Food)).await;
    assert_eq!(state.expense_count, 2);
    assert_eq!(state.total_amount, money("110"));

    feed.set_search("GROC");
    let state = wait_until(&mut rx, |s| s.filter.search_query == "GROC").await;
    assert_eq!(state.expenses.len(), 1);
    assert_eq!(state.expenses[0].id, "c");
}

#[tokio::test]
async fn test_custom_range_applies_as_one_update() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(&store, QueryEngine::new(), clock, FilterState::new());
    let mut rx = feed.subscribe();
    wait_until(&mut rx, |s| !s.is_loading).await;

    let start = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
    feed.set_custom_range(Some(start), Some(end));

    let state = wait_until(&mut rx, |s| s.filter.custom_end.is_some()).await;
    assert_eq!(state.filter.date_filter, DateFilter::CustomRange);
    assert_eq!(state.filter.custom_start, Some(start));
    // both boundary days are included
    let ids: Vec<&str> = state.expenses.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[tokio::test]
async fn test_insert_through_service_updates_feed() {
    let store = Arc::new(MemoryStore::with_records(week_records()));
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(
        store.as_ref(),
        QueryEngine::new(),
        clock.clone(),
        FilterState::new(),
    );
    let mut rx = feed.subscribe();
    let state = wait_until(&mut rx, |s| !s.is_loading).await;
    assert_eq!(state.expense_count, 1);

    let service = ExpenseService::new(store.clone(), clock, DuplicateGuard::default());
    let outcome = service
        .add(NewExpense::new("Coffee", money("3.80"), Category::Food), InsertMode::Checked)
        .await
        .unwrap();
    assert!(matches!(outcome, AddOutcome::Added(_)));

    let state = wait_until(&mut rx, |s| s.expense_count == 2).await;
    assert_eq!(state.total_amount, money("28.80"));
    assert_eq!(state.expenses[0].title, "Coffee");
}

#[tokio::test]
async fn test_duplicate_needs_force() {
    let store = Arc::new(MemoryStore::with_records(week_records()));
    let clock = Arc::new(FixedClock::new(now()));
    let service = ExpenseService::new(store.clone(), clock, DuplicateGuard::default());

    let draft = NewExpense::new(" lunch ", money("25"), Category::Food);
    let outcome = service.add(draft.clone(), InsertMode::Checked).await.unwrap();
    match outcome {
        AddOutcome::DuplicateSuspected { existing } => assert_eq!(existing.id, "a"),
        other => panic!("expected duplicate warning, got {:?}", other),
    }
    assert_eq!(store.records().len(), 3);

    service.add(draft, InsertMode::Force).await.unwrap();
    assert_eq!(store.records().len(), 4);
}

#[tokio::test]
async fn test_store_failure_keeps_last_good_view() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(
        &store,
        QueryEngine::new(),
        clock,
        FilterState::new().date_filter(DateFilter::AllTime),
    );
    let mut rx = feed.subscribe();
    let good = wait_until(&mut rx, |s| !s.is_loading).await;

    store.publish_failure("permission denied");
    let failed = wait_until(&mut rx, |s| s.error_message.is_some()).await;
    assert_eq!(failed.expenses, good.expenses);
    assert_eq!(failed.total_amount, good.total_amount);
    assert_eq!(
        failed.error_message.as_deref(),
        Some("Failed to load expenses: permission denied")
    );

    feed.clear_error();
    assert!(feed.current().error_message.is_none());

    store.replace_all(week_records());
    let recovered = wait_until(&mut rx, |s| s.expense_count == 3).await;
    assert!(recovered.error_message.is_none());
}

#[tokio::test]
async fn test_loading_store_publishes_loading_state() {
    let store = MemoryStore::loading();
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(&store, QueryEngine::new(), clock, FilterState::new());
    let mut rx = feed.subscribe();

    assert!(feed.current().is_loading);

    store.replace_all(week_records());
    let state = wait_until(&mut rx, |s| !s.is_loading).await;
    assert_eq!(state.expense_count, 1);
}

#[tokio::test]
async fn test_filter_change_while_loading_waits_for_data() {
    let store = MemoryStore::loading();
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(&store, QueryEngine::new(), clock, FilterState::new());
    let mut rx = feed.subscribe();

    feed.set_category(Some(Category::Travel));
    store.replace_all(week_records());

    // the first state claiming the new filter is one computed for it
    let state = wait_until(&mut rx, |s| s.filter.category == Some(Category::Travel)).await;
    assert!(!state.is_loading);
    assert_eq!(state.expense_count, 0);

    feed.set_date_filter(DateFilter::AllTime);
    let state = wait_until(&mut rx, |s| s.filter.date_filter == DateFilter::AllTime).await;
    assert_eq!(state.expense_count, 1);
    assert_eq!(state.expenses[0].id, "b");
}

#[tokio::test]
async fn test_view_refresh_after_midnight() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let feed = ViewFeed::spawn(&store, QueryEngine::new(), clock.clone(), FilterState::new());
    let mut rx = feed.subscribe();
    let state = wait_until(&mut rx, |s| !s.is_loading).await;
    assert_eq!(state.expense_count, 1);

    clock.set(at(2024, 6, 14, 0));
    feed.refresh();
    let state = wait_until(&mut rx, |s| s.expense_count == 0).await;
    assert_eq!(state.filter, FilterState::new());
    assert_eq!(state.total_amount, Decimal::ZERO);
}

// =============================================================================
// Report feed
// =============================================================================

#[tokio::test]
async fn test_report_feed_window_and_period() {
    let mut records = week_records();
    records.push(record("d", "Flight", "300", Category::Travel, at(2024, 5, 20, 7)));
    let store = MemoryStore::with_records(records);
    let clock = Arc::new(FixedClock::new(now()));
    let june = YearMonth::new(2024, 6).unwrap();

    let feed = ReportFeed::spawn(&store, ReportEngine::new(), clock, june);
    let mut rx = feed.subscribe();
    let state = wait_until(&mut rx, |s| !s.is_loading).await;

    assert_eq!(state.daily_series.len(), 7);
    assert_eq!(state.last_7_days_total, money("155"));
    assert_eq!(state.monthly_report.total_expenses, money("155"));
    assert_eq!(state.monthly_report.expense_count, 3);

    let may = YearMonth::new(2024, 5).unwrap();
    feed.select_period(may);
    let state = wait_until(&mut rx, |s| s.selected_period == may && !s.is_loading).await;
    assert_eq!(state.monthly_report.total_expenses, money("300"));
    assert_eq!(state.monthly_report.top_categories.len(), 1);
    assert_eq!(feed.period(), may);
}

#[tokio::test]
async fn test_report_failure_then_select_period_clears_error() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let june = YearMonth::new(2024, 6).unwrap();

    let feed = ReportFeed::spawn(&store, ReportEngine::new(), clock, june);
    let mut rx = feed.subscribe();
    let good = wait_until(&mut rx, |s| !s.is_loading).await;

    store.publish_failure("corrupt file");
    let failed = wait_until(&mut rx, |s| s.error_message.is_some()).await;
    assert_eq!(failed.daily_series, good.daily_series);
    assert_eq!(
        failed.error_message.as_deref(),
        Some("Failed to load report data: corrupt file")
    );

    store.replace_all(week_records());
    let may = YearMonth::new(2024, 5).unwrap();
    feed.select_period(may);
    let state = wait_until(&mut rx, |s| s.selected_period == may && s.error_message.is_none()).await;
    assert_eq!(state.monthly_report.expense_count, 0);
}

#[tokio::test]
async fn test_report_refresh_after_clock_moves() {
    let store = MemoryStore::with_records(week_records());
    let clock = Arc::new(FixedClock::new(now()));
    let june = YearMonth::new(2024, 6).unwrap();

    let feed = ReportFeed::spawn(&store, ReportEngine::new(), clock.clone(), june);
    let mut rx = feed.subscribe();
    wait_until(&mut rx, |s| !s.is_loading).await;

    // a week later nothing falls in the window any more
    clock.set(at(2024, 6, 20, 9));
    feed.refresh();
    let state = wait_until(&mut rx, |s| s.last_7_days_total == Decimal::ZERO).await;
    assert!(state.category_series.is_empty());
    assert_eq!(
        state.daily_series.last().map(|d| d.date),
        NaiveDate::from_ymd_opt(2024, 6, 20)
    );
}

#[tokio::test]
async fn test_store_snapshot_seen_by_trait_object() {
    let store: Arc<dyn ExpenseStore> = Arc::new(MemoryStore::with_records(week_records()));
    let rx = store.subscribe();
    assert_eq!(rx.borrow().records().map(|r| r.len()), Some(3));
}
