//! Export formatting for expense records
//!
//! Renders:
//! - CSV with a fixed `Date,Title,Category,Amount,Description` header
//! - A plain-text report with a summary block and a detail table
//! - A short shareable summary with a per-category breakdown
//!
//! Rendering is pure. Writing the bytes somewhere is the job of an
//! [`ExportSink`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};

use crate::config::{MAX_DESCRIPTION_WIDTH, MIN_DESCRIPTION_WIDTH};
use crate::error::Error;
use crate::models::{Category, Expense};

pub const CSV_HEADER: &str = "Date,Title,Category,Amount,Description";

const GENERATED_FORMAT: &str = "%b %d, %Y at %H:%M";
const SHARE_GENERATED_FORMAT: &str = "%b %d, %Y %H:%M";
const ROW_DATE_FORMAT: &str = "%b %d";

/// Output formats the exporter can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Text => "text/plain",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Text => "TXT",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Text),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of an export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResult {
    Success { path: String, format: ExportFormat },
    Error { message: String },
}

impl ExportResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExportResult::Success { .. })
    }
}

/// Destination for rendered export bytes
pub trait ExportSink {
    /// Store `contents` under `file_name`, returning where it went
    fn write(&self, file_name: &str, contents: &[u8]) -> std::io::Result<String>;
}

/// Writes exports into a directory, creating it if needed
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectorySink {
    fn write(&self, file_name: &str, contents: &[u8]) -> std::io::Result<String> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;
        Ok(path.display().to_string())
    }
}

/// Renders record lists into export formats
#[derive(Debug, Clone)]
pub struct ExportFormatter {
    description_width: usize,
    title_width: usize,
    currency_symbol: String,
    base_filename: String,
}

impl Default for ExportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportFormatter {
    pub fn new() -> Self {
        Self {
            description_width: MAX_DESCRIPTION_WIDTH,
            title_width: 15,
            currency_symbol: "$".to_string(),
            base_filename: "expense_report".to_string(),
        }
    }

    /// Description column width, clamped to 30..=50 characters
    pub fn description_width(mut self, width: usize) -> Self {
        self.description_width = width.clamp(MIN_DESCRIPTION_WIDTH, MAX_DESCRIPTION_WIDTH);
        self
    }

    pub fn title_width(mut self, width: usize) -> Self {
        self.title_width = width.max(1);
        self
    }

    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn base_filename(mut self, name: impl Into<String>) -> Self {
        self.base_filename = name.into();
        self
    }

    pub fn file_name(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.base_filename, format.extension())
    }

    /// CSV with one row per record, most recent first
    pub fn to_csv(&self, records: &[Expense]) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');

        for expense in sorted_desc(records) {
            let _ = writeln!(
                out,
                "{},{},{},{},{}",
                expense.date().format("%Y-%m-%d"),
                quote_csv_field(&expense.title),
                quote_csv_field(expense.category.display_name()),
                expense.amount,
                quote_csv_field(expense.description_text()),
            );
        }

        out
    }

    /// Human-readable report: header, summary and (when non-empty) details
    pub fn to_plain_text_report(&self, records: &[Expense], generated_at: NaiveDateTime) -> String {
        let total: Decimal = records.iter().map(|e| e.amount).sum();
        let mut out = String::new();

        out.push_str("EXPENSE REPORT\n");
        out.push_str(&"=".repeat(50));
        out.push_str("\n\n");

        out.push_str("SUMMARY\n");
        out.push_str(&"-".repeat(20));
        out.push('\n');
        let _ = writeln!(out, "Total Expenses: {}", self.money(total));
        let _ = writeln!(out, "Number of Expenses: {}", records.len());
        let _ = writeln!(out, "Generated on: {}", generated_at.format(GENERATED_FORMAT));
        out.push('\n');

        if records.is_empty() {
            return out;
        }

        out.push_str("EXPENSE DETAILS\n");
        out.push_str(&"-".repeat(50));
        out.push('\n');
        out.push_str("Date\t\tTitle\t\tCategory\tAmount\tDescription\n");
        out.push_str(&"-".repeat(50));
        out.push('\n');

        for expense in sorted_desc(records) {
            let _ = writeln!(
                out,
                "{}\t\t{}\t\t{}\t{}\t{}",
                expense.timestamp.format(ROW_DATE_FORMAT),
                expense.title.chars().take(self.title_width).collect::<String>(),
                expense.category.display_name(),
                self.money(expense.amount),
                truncate(expense.description_text(), self.description_width),
            );
        }

        out
    }

    /// Short text suitable for sharing: totals plus a category breakdown
    pub fn share_summary(&self, records: &[Expense], generated_at: NaiveDateTime) -> String {
        let total: Decimal = records.iter().map(|e| e.amount).sum();

        let mut by_category: BTreeMap<Category, Decimal> = BTreeMap::new();
        for expense in records {
            *by_category.entry(expense.category).or_default() += expense.amount;
        }
        let mut breakdown: Vec<(Category, Decimal)> = by_category.into_iter().collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1));

        let mut out = String::new();
        out.push_str("Expense Report\n");
        out.push_str(&"=".repeat(16));
        out.push('\n');
        let _ = writeln!(out, "Total Expenses: {}", self.money(total));
        let _ = writeln!(out, "Number of Expenses: {}", records.len());
        out.push('\n');
        out.push_str("Category Breakdown:\n");
        for (category, amount) in breakdown {
            let _ = writeln!(out, "• {}: {}", category.display_name(), self.money(amount));
        }
        out.push('\n');
        let _ = writeln!(out, "Generated on: {}", generated_at.format(SHARE_GENERATED_FORMAT));

        out
    }

    /// Render `records` and hand them to `sink`
    pub fn export_to(
        &self,
        records: &[Expense],
        format: ExportFormat,
        generated_at: NaiveDateTime,
        sink: &dyn ExportSink,
    ) -> ExportResult {
        let contents = match format {
            ExportFormat::Csv => self.to_csv(records),
            ExportFormat::Text => self.to_plain_text_report(records, generated_at),
        };
        let file_name = self.file_name(format);

        match sink.write(&file_name, contents.as_bytes()) {
            Ok(path) => {
                info!(path = %path, format = %format, count = records.len(), "Exported expenses");
                ExportResult::Success { path, format }
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "Export failed");
                ExportResult::Error {
                    message: format!("Failed to export {}: {}", format.label(), e),
                }
            }
        }
    }

    fn money(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{}{:.2}", self.currency_symbol, rounded)
    }
}

fn sorted_desc(records: &[Expense]) -> Vec<&Expense> {
    let mut sorted: Vec<&Expense> = records.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Always quoted, with embedded quotes doubled
fn quote_csv_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// First `max_chars` characters, with "..." appended when cut
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
