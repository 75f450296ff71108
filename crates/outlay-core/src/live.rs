//! Live feeds of derived state
//!
//! Each feed combines the latest store snapshot with its own parameter
//! value (the filter tuple, or the selected report period) and publishes
//! one freshly computed state per change on a `watch` channel.
//!
//! Parameters live in a single `watch` value that is read and replaced as
//! a whole, so a recompute always sees a complete tuple. Subscribers only
//! ever observe the newest published state.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::models::{Category, DateFilter, FilterState, GroupBy, ReportState, ViewState, YearMonth};
use crate::query::QueryEngine;
use crate::reports::ReportEngine;
use crate::store::{ExpenseStore, StoreSnapshot};

/// Next list state for a snapshot and filter
///
/// While the store is loading or after a failed read the previous state is
/// kept whole, including the filter it was computed for. Only the loading
/// flag or the error message changes.
pub fn view_transition(
    engine: &QueryEngine,
    snapshot: &StoreSnapshot,
    filter: &FilterState,
    clock: &dyn Clock,
    previous: &ViewState,
) -> ViewState {
    match snapshot {
        StoreSnapshot::Ready(records) => engine.recompute(records, filter, clock.now()),
        StoreSnapshot::Loading => ViewState {
            is_loading: true,
            ..previous.clone()
        },
        StoreSnapshot::Failed(message) => {
            warn!(error = %message, "Keeping last expense view after store failure");
            ViewState {
                is_loading: false,
                error_message: Some(format!("Failed to load expenses: {}", message)),
                ..previous.clone()
            }
        }
    }
}

/// Next report state for a snapshot and period
pub fn report_transition(
    engine: &ReportEngine,
    snapshot: &StoreSnapshot,
    period: YearMonth,
    today: NaiveDate,
    previous: &ReportState,
) -> ReportState {
    match snapshot {
        StoreSnapshot::Ready(records) => engine.build(records, period, today),
        StoreSnapshot::Loading => ReportState {
            is_loading: true,
            ..previous.clone()
        },
        StoreSnapshot::Failed(message) => {
            warn!(error = %message, "Keeping last reports after store failure");
            ReportState {
                is_loading: false,
                error_message: Some(format!("Failed to load report data: {}", message)),
                ..previous.clone()
            }
        }
    }
}

/// Recompute loop shared by both feeds
///
/// Ends when either input channel closes.
async fn drive<P, S, F>(
    mut store_rx: watch::Receiver<StoreSnapshot>,
    mut params_rx: watch::Receiver<P>,
    state_tx: Arc<watch::Sender<S>>,
    mut step: F,
) where
    P: Clone + Send + Sync + 'static,
    S: Send + Sync + 'static,
    F: FnMut(&StoreSnapshot, &P, &S) -> S + Send + 'static,
{
    loop {
        let snapshot = store_rx.borrow_and_update().clone();
        let params = params_rx.borrow_and_update().clone();
        let next = {
            let current = state_tx.borrow();
            step(&snapshot, &params, &current)
        };
        state_tx.send_replace(next);

        tokio::select! {
            changed = store_rx.changed() => {
                if changed.is_err() {
                    debug!("Store closed, stopping feed");
                    break;
                }
            }
            changed = params_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

/// Filtered, grouped expense list that follows the store
///
/// Must be created inside a Tokio runtime. Dropping the feed stops its task.
pub struct ViewFeed {
    filter_tx: watch::Sender<FilterState>,
    state_tx: Arc<watch::Sender<ViewState>>,
    task: JoinHandle<()>,
}

impl ViewFeed {
    pub fn spawn(
        store: &dyn ExpenseStore,
        engine: QueryEngine,
        clock: Arc<dyn Clock>,
        filter: FilterState,
    ) -> Self {
        let (filter_tx, filter_rx) = watch::channel(filter.clone());
        let state_tx = Arc::new(watch::channel(ViewState::loading(filter)).0);

        let task = tokio::spawn(drive(
            store.subscribe(),
            filter_rx,
            Arc::clone(&state_tx),
            move |snapshot, filter, previous| {
                view_transition(&engine, snapshot, filter, clock.as_ref(), previous)
            },
        ));

        Self {
            filter_tx,
            state_tx,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    /// Most recently published state
    pub fn current(&self) -> ViewState {
        self.state_tx.borrow().clone()
    }

    pub fn filter(&self) -> FilterState {
        self.filter_tx.borrow().clone()
    }

    /// Apply several filter changes as one update
    pub fn update_filter(&self, change: impl FnOnce(&mut FilterState)) {
        self.filter_tx.send_modify(change);
    }

    pub fn set_search(&self, query: impl Into<String>) {
        let query = query.into();
        self.update_filter(|f| f.search_query = query);
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.update_filter(|f| f.category = category);
    }

    pub fn set_group_by(&self, group_by: GroupBy) {
        self.update_filter(|f| f.group_by = group_by);
    }

    pub fn set_date_filter(&self, date_filter: DateFilter) {
        self.update_filter(|f| f.date_filter = date_filter);
    }

    /// Set both custom bounds; switches to `CustomRange` when both are present
    pub fn set_custom_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.update_filter(|f| *f = f.clone().custom_range(start, end));
    }

    /// Recompute from the current snapshot, e.g. after the date rolls over
    pub fn refresh(&self) {
        self.filter_tx.send_modify(|_| {});
    }

    pub fn clear_error(&self) {
        self.state_tx.send_if_modified(|s| s.error_message.take().is_some());
    }
}

impl Drop for ViewFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Report state for a selected month that follows the store
///
/// Must be created inside a Tokio runtime. Dropping the feed stops its task.
pub struct ReportFeed {
    period_tx: watch::Sender<YearMonth>,
    state_tx: Arc<watch::Sender<ReportState>>,
    task: JoinHandle<()>,
}

impl ReportFeed {
    pub fn spawn(
        store: &dyn ExpenseStore,
        engine: ReportEngine,
        clock: Arc<dyn Clock>,
        period: YearMonth,
    ) -> Self {
        let (period_tx, period_rx) = watch::channel(period);
        let state_tx = Arc::new(watch::channel(ReportState::loading(period)).0);

        let task = tokio::spawn(drive(
            store.subscribe(),
            period_rx,
            Arc::clone(&state_tx),
            move |snapshot, period, previous| {
                report_transition(&engine, snapshot, *period, clock.today(), previous)
            },
        ));

        Self {
            period_tx,
            state_tx,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> ReportState {
        self.state_tx.borrow().clone()
    }

    pub fn period(&self) -> YearMonth {
        *self.period_tx.borrow()
    }

    /// Switch the monthly report to `period`, clearing any error
    pub fn select_period(&self, period: YearMonth) {
        self.clear_error();
        self.period_tx.send_replace(period);
    }

    /// Recompute from the current snapshot
    pub fn refresh(&self) {
        self.period_tx.send_modify(|_| {});
    }

    pub fn clear_error(&self) {
        self.state_tx.send_if_modified(|s| s.error_message.take().is_some());
    }
}

impl Drop for ReportFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
