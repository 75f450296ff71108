//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (config loading, snapshot reads, argument parsers)
//! - `expenses` - Write commands (add, update, delete)
//! - `export` - CSV and plain-text export
//! - `list` - Filtered, grouped expense list
//! - `reports` - 7-day, monthly and summary reports
//! - `store` - JSON file backed expense store

pub mod common;
pub mod expenses;
pub mod export;
pub mod list;
pub mod reports;
pub mod store;

// Re-export command functions for main.rs
pub use common::*;
pub use expenses::*;
pub use export::*;
pub use list::*;
pub use reports::*;
pub use store::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
