//! Outlay CLI - Expense tracker
//!
//! Usage:
//!   outlay add "Lunch" 12.50 --category food    Log an expense
//!   outlay list --date week --group category    Filtered, grouped list
//!   outlay report --period 2024-06              7-day and monthly reports
//!   outlay export --format csv --out ./exports  Export to a file

mod cli;
mod commands;


use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use outlay_core::{Clock, ExpenseService, SystemClock};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_engine_config(cli.config.as_deref())?;
    let store = Arc::new(commands::JsonFileStore::open(&cli.data)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match cli.command {
        Commands::List {
            search,
            category,
            date,
            from,
            to,
            group,
        } => {
            let filter = commands::build_filter(
                search.as_deref(),
                category.as_deref(),
                &date,
                from.as_deref(),
                to.as_deref(),
                &group,
            )?;
            commands::cmd_list(store.as_ref(), &config, clock.as_ref(), &filter)
        }
        Commands::Add {
            title,
            amount,
            category,
            description,
            recurring,
            force,
        } => {
            let service = ExpenseService::new(store, clock, config.duplicate_guard());
            commands::cmd_add(
                &service,
                &title,
                &amount,
                &category,
                description.as_deref(),
                recurring,
                force,
                &config.currency_symbol,
            )
            .await
        }
        Commands::Update {
            id,
            title,
            amount,
            category,
            description,
        } => {
            let service = ExpenseService::new(store, clock, config.duplicate_guard());
            commands::cmd_update(
                &service,
                &id,
                title.as_deref(),
                amount.as_deref(),
                category.as_deref(),
                description.as_deref(),
            )
            .await
        }
        Commands::Delete { id } => {
            let service = ExpenseService::new(store, clock, config.duplicate_guard());
            commands::cmd_delete(&service, &id).await
        }
        Commands::Report { period } => {
            let period = commands::resolve_period(period.as_deref(), clock.as_ref())?;
            commands::cmd_report(store.as_ref(), &config, clock.as_ref(), period)
        }
        Commands::Export { format, out } => commands::cmd_export(
            store.as_ref(),
            &config,
            clock.as_ref(),
            &format,
            out.as_deref(),
        ),
        Commands::Summary => commands::cmd_summary(store.as_ref(), &config, clock.as_ref()),
    }
}
