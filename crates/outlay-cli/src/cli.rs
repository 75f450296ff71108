//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - Track where the money goes
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Expense tracker with filtered lists, reports and exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Expense data file (JSON)
    #[arg(long, default_value = "expenses.json", global = true)]
    pub data: PathBuf,

    /// Engine config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List expenses with filters and grouping
    List {
        /// Case-insensitive text matched against title and description
        #[arg(short, long)]
        search: Option<String>,

        /// Category id or name (staff, travel, food, utility, ...)
        #[arg(short, long)]
        category: Option<String>,

        /// Date filter: today, week, month, custom, all
        #[arg(short, long, default_value = "today")]
        date: String,

        /// Custom range start (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Custom range end (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Grouping: none, category, time
        #[arg(short, long, default_value = "none")]
        group: String,
    },

    /// Add an expense
    Add {
        /// What the money was spent on
        title: String,

        /// Amount, e.g. 12.50
        amount: String,

        /// Category id or name
        #[arg(short, long)]
        category: String,

        /// Optional notes
        #[arg(short, long)]
        description: Option<String>,

        /// Mark as a recurring expense
        #[arg(long)]
        recurring: bool,

        /// Add even if it looks like a duplicate of one logged today
        #[arg(long)]
        force: bool,
    },

    /// Update an existing expense
    Update {
        /// Expense id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        amount: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense id
        id: String,
    },

    /// Show 7-day and monthly reports
    Report {
        /// Month to report on (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Export expenses
    Export {
        /// Format: csv, txt
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Directory to write into (prints to stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Today's total, this month's top categories and a shareable summary
    Summary,
}
