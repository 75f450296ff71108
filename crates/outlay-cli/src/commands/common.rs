//! Shared utilities for command implementations
//!
//! This module contains:
//! - `load_engine_config` - Resolve the engine config for this run
//! - `current_records` - Read the store's current snapshot
//! - Parsers for amounts, dates and categories given on the command line

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use outlay_core::{Category, EngineConfig, Expense, ExpenseStore, StoreSnapshot};
use rust_decimal::Decimal;

/// Explicit `--config` path, else the data-dir override, else built-in defaults
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load_from(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => EngineConfig::load().context("Failed to load config"),
    }
}

pub fn current_records(store: &dyn ExpenseStore) -> Result<Arc<Vec<Expense>>> {
    match store.snapshot() {
        StoreSnapshot::Ready(records) => Ok(records),
        StoreSnapshot::Loading => anyhow::bail!("Expense data is still loading"),
        StoreSnapshot::Failed(message) => anyhow::bail!("Failed to load expenses: {}", message),
    }
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    s.trim()
        .trim_start_matches('$')
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount: {}", s))
}

pub fn parse_date(s: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

pub fn parse_category(s: &str) -> Result<Category> {
    s.parse::<Category>().map_err(anyhow::Error::msg)
}
