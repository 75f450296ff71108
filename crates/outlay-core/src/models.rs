//! Domain models for Outlay

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Expense category reference data
///
/// The first four variants are the categories offered for new expenses.
/// The remaining variants are legacy categories that older records may
/// still carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Staff,
    Travel,
    Food,
    Utility,
    Transport,
    Shopping,
    Entertainment,
    Health,
    Education,
    Other,
}

impl Category {
    /// Categories offered when creating an expense
    pub const PRIMARY: [Category; 4] = [Self::Staff, Self::Travel, Self::Food, Self::Utility];

    /// Every known category, primary first
    pub const ALL: [Category; 10] = [
        Self::Staff,
        Self::Travel,
        Self::Food,
        Self::Utility,
        Self::Transport,
        Self::Shopping,
        Self::Entertainment,
        Self::Health,
        Self::Education,
        Self::Other,
    ];

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Travel => "travel",
            Self::Food => "food",
            Self::Utility => "utility",
            Self::Transport => "transport",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Education => "education",
            Self::Other => "other",
        }
    }

    /// Human-readable name, also used as the group label
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Travel => "Travel",
            Self::Food => "Food",
            Self::Utility => "Utility",
            Self::Transport => "Transportation",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health & Fitness",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }

    /// ARGB color tag
    pub fn color(&self) -> u32 {
        match self {
            Self::Staff => 0xFF2196F3,
            Self::Travel => 0xFF00BCD4,
            Self::Food => 0xFFFF5722,
            Self::Utility => 0xFFFF9800,
            Self::Transport => 0xFF2196F3,
            Self::Shopping => 0xFFE91E63,
            Self::Entertainment => 0xFF9C27B0,
            Self::Health => 0xFF4CAF50,
            Self::Education => 0xFF3F51B5,
            Self::Other => 0xFF607D8B,
        }
    }

    pub fn is_legacy(&self) -> bool {
        !Self::PRIMARY.contains(self)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Accepts either the id or the display name, case-insensitively
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(needle) || c.display_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A logged expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    /// Local creation time
    pub timestamp: NaiveDateTime,
    /// Carried for the UI; no engine logic depends on it
    #[serde(default)]
    pub is_recurring: bool,
    /// Opaque reference to an attached receipt image
    #[serde(default)]
    pub receipt_ref: Option<String>,
}

impl Expense {
    /// Calendar date of the expense, ignoring time of day
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn period(&self) -> YearMonth {
        YearMonth::from_date(self.date())
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// An expense about to be created (before it has an id or timestamp)
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    pub description: Option<String>,
    pub is_recurring: bool,
    pub receipt_ref: Option<String>,
}

impl NewExpense {
    pub fn new(title: impl Into<String>, amount: Decimal, category: Category) -> Self {
        Self {
            title: title.into(),
            amount,
            category,
            description: None,
            is_recurring: false,
            receipt_ref: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn recurring(mut self, value: bool) -> Self {
        self.is_recurring = value;
        self
    }

    pub fn receipt_ref(mut self, receipt: Option<String>) -> Self {
        self.receipt_ref = receipt;
        self
    }

    /// Materialize into a stored record
    pub fn into_expense(self, id: String, timestamp: NaiveDateTime) -> Expense {
        Expense {
            id,
            title: self.title.trim().to_string(),
            amount: self.amount,
            category: self.category,
            description: self.description,
            timestamp,
            is_recurring: self.is_recurring,
            receipt_ref: self.receipt_ref,
        }
    }
}

/// Relative or explicit date restriction for the expense list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    Today,
    ThisWeek,
    ThisMonth,
    CustomRange,
    AllTime,
}

impl DateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
            Self::CustomRange => "custom_range",
            Self::AllTime => "all_time",
        }
    }
}

impl std::str::FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "today" => Ok(Self::Today),
            "this_week" | "week" => Ok(Self::ThisWeek),
            "this_month" | "month" => Ok(Self::ThisMonth),
            "custom_range" | "custom" => Ok(Self::CustomRange),
            "all_time" | "all" => Ok(Self::AllTime),
            _ => Err(format!("Unknown date filter: {}", s)),
        }
    }
}

impl std::fmt::Display for DateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the filtered list is bucketed for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Category,
    Time,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Category => "category",
            Self::Time => "time",
        }
    }
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "category" => Ok(Self::Category),
            "time" | "date" => Ok(Self::Time),
            _ => Err(format!("Unknown grouping: {}", s)),
        }
    }
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The filter tuple: every independently settable list parameter
///
/// A value of this type is always read and replaced as a whole, so a
/// recompute never sees half of an update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive substring matched against title and description
    pub search_query: String,
    pub category: Option<Category>,
    pub date_filter: DateFilter,
    /// Inclusive start, only used with `DateFilter::CustomRange`
    pub custom_start: Option<NaiveDate>,
    /// Inclusive end, only used with `DateFilter::CustomRange`
    pub custom_end: Option<NaiveDate>,
    pub group_by: GroupBy,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn date_filter(mut self, filter: DateFilter) -> Self {
        self.date_filter = filter;
        self
    }

    /// Set both custom bounds; switches to `CustomRange` when both are present
    pub fn custom_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.custom_start = start;
        self.custom_end = end;
        if start.is_some() && end.is_some() {
            self.date_filter = DateFilter::CustomRange;
        }
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }
}

/// One labelled bucket of the grouped list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseGroup {
    pub label: String,
    pub expenses: Vec<Expense>,
}

impl ExpenseGroup {
    pub fn total(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

/// Derived list state, replaced wholesale on every recompute
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewState {
    /// The filter tuple this state was computed from
    pub filter: FilterState,
    /// Filtered records, most recent first
    pub expenses: Vec<Expense>,
    pub total_amount: Decimal,
    pub expense_count: usize,
    /// Groups in first-seen order
    pub grouped_expenses: Vec<ExpenseGroup>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl ViewState {
    /// Initial state published before the first snapshot arrives
    pub fn loading(filter: FilterState) -> Self {
        Self {
            filter,
            is_loading: true,
            ..Default::default()
        }
    }

    /// Look up a group by label
    pub fn group(&self, label: &str) -> Option<&ExpenseGroup> {
        self.grouped_expenses.iter().find(|g| g.label == label)
    }
}

/// A calendar month
///
/// Fields are public so callers can build any value; `days_in_month`
/// reports 0 for a month outside 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let ym = Self { year, month };
        if ym.first_day().is_none() {
            return Err(Error::Validation(format!(
                "Invalid period: {}-{:02}",
                year, month
            )));
        }
        Ok(ym)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Length of the month in days (28-31), or 0 for a malformed period
    pub fn days_in_month(&self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.map(|n| (n - first).num_days() as u32).unwrap_or(0)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        let first = self.first_day()?;
        first.with_day(self.days_in_month())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::str::FromStr for YearMonth {
    type Err = Error;

    /// Parses `YYYY-MM`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("Invalid period '{}' (use YYYY-MM)", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One bucket of the rolling 7-day series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub expense_count: usize,
}

impl DailyExpense {
    /// Short chart label, e.g. "Oct 19"
    pub fn label(&self) -> String {
        self.date.format("%b %d").to_string()
    }
}

/// Per-category share of the rolling 7-day window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpense {
    pub category: Category,
    pub total_amount: Decimal,
    /// 0-100, never negative or non-finite
    pub percentage: f64,
    pub expense_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: Category,
    pub amount: Decimal,
}

/// Aggregate for a single calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub period: YearMonth,
    pub total_expenses: Decimal,
    pub expense_count: usize,
    pub category_breakdown: BTreeMap<Category, Decimal>,
    /// Highest-spend categories, descending
    pub top_categories: Vec<CategoryAmount>,
    pub average_daily: Decimal,
}

impl MonthlyReport {
    pub fn empty(period: YearMonth) -> Self {
        Self {
            period,
            total_expenses: Decimal::ZERO,
            expense_count: 0,
            category_breakdown: BTreeMap::new(),
            top_categories: Vec::new(),
            average_daily: Decimal::ZERO,
        }
    }
}

/// All expenses of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensesByCategory {
    pub category: Category,
    /// Most recent first
    pub expenses: Vec<Expense>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: YearMonth,
    pub total_amount: Decimal,
    pub expense_count: usize,
}

/// Today's running total
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TodaySummary {
    pub total_amount: Decimal,
    pub expense_count: usize,
}

/// Derived report state, replaced wholesale on every recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportState {
    pub selected_period: YearMonth,
    /// Exactly 7 entries, oldest first, ending today
    pub daily_series: Vec<DailyExpense>,
    pub category_series: Vec<CategoryExpense>,
    pub monthly_report: MonthlyReport,
    pub last_7_days_total: Decimal,
    pub expenses_by_category: Vec<ExpensesByCategory>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl ReportState {
    /// Initial state published before the first snapshot arrives
    pub fn loading(period: YearMonth) -> Self {
        Self {
            selected_period: period,
            daily_series: Vec::new(),
            category_series: Vec::new(),
            monthly_report: MonthlyReport::empty(period),
            last_7_days_total: Decimal::ZERO,
            expenses_by_category: Vec::new(),
            monthly_trends: Vec::new(),
            is_loading: true,
            error_message: None,
        }
    }
}
