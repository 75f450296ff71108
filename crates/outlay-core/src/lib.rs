//! Outlay Core Library
//!
//! Expense query and reporting engine for the Outlay expense tracker:
//! - Filtered, sorted and grouped expense lists
//! - Rolling 7-day and monthly spending reports
//! - Insert validation and same-day duplicate detection
//! - CSV, plain-text and shareable summary exports
//! - Live feeds that recompute derived state on every store or filter change

pub mod clock;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod export;
pub mod live;
pub mod models;
pub mod query;
pub mod reports;
pub mod service;
pub mod store;

/// Test utilities: timestamp and expense builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use duplicate::DuplicateGuard;
pub use error::{Error, Result};
pub use export::{DirectorySink, ExportFormat, ExportFormatter, ExportResult, ExportSink};
pub use live::{ReportFeed, ViewFeed};
pub use models::{
    Category, CategoryAmount, CategoryExpense, DailyExpense, DateFilter, Expense, ExpenseGroup,
    ExpensesByCategory, FilterState, GroupBy, MonthlyReport, MonthlyTrend, NewExpense,
    ReportState, TodaySummary, ViewState, YearMonth,
};
pub use query::QueryEngine;
pub use reports::ReportEngine;
pub use service::{AddOutcome, ExpenseService, InsertMode};
pub use store::{ExpenseStore, MemoryStore, StoreSnapshot};
