//! List command implementation

use anyhow::Result;
use outlay_core::{
    Clock, DateFilter, EngineConfig, ExpenseStore, FilterState, GroupBy, ViewState,
};

use super::{current_records, parse_category, parse_date, truncate};

/// Build the filter tuple from `list` flags
///
/// `--from`/`--to` together switch the date filter to a custom range.
pub fn build_filter(
    search: Option<&str>,
    category: Option<&str>,
    date: &str,
    from: Option<&str>,
    to: Option<&str>,
    group: &str,
) -> Result<FilterState> {
    let category = category.map(parse_category).transpose()?;
    let date_filter: DateFilter = date.parse().map_err(anyhow::Error::msg)?;
    let group_by: GroupBy = group.parse().map_err(anyhow::Error::msg)?;
    let start = from.map(|s| parse_date(s, "--from")).transpose()?;
    let end = to.map(|s| parse_date(s, "--to")).transpose()?;

    Ok(FilterState::new()
        .search(search.unwrap_or_default())
        .category(category)
        .date_filter(date_filter)
        .custom_range(start, end)
        .group_by(group_by))
}

pub fn cmd_list(
    store: &dyn ExpenseStore,
    config: &EngineConfig,
    clock: &dyn Clock,
    filter: &FilterState,
) -> Result<()> {
    let records = current_records(store)?;
    let view = config.query_engine().recompute(&records, filter, clock.now());
    print_view(&view, &config.currency_symbol);
    Ok(())
}

fn print_view(view: &ViewState, currency: &str) {
    if view.expenses.is_empty() {
        println!("No expenses match these filters.");
        return;
    }

    println!();
    println!(
        "🧾 Expenses ({}, {} total: {}{:.2})",
        view.filter.date_filter,
        view.expense_count,
        currency,
        view.total_amount
    );

    for group in &view.grouped_expenses {
        println!();
        println!(
            "   {} ({} · {}{:.2})",
            group.label,
            group.expenses.len(),
            currency,
            group.total()
        );
        println!("   ─────────────────────────────────────────────────────────────");
        for expense in &group.expenses {
            println!(
                "   {} │ {:>10} │ {:<14} │ {}  [{}]",
                expense.timestamp.format("%Y-%m-%d %H:%M"),
                format!("{}{:.2}", currency, expense.amount),
                expense.category.display_name(),
                truncate(&expense.title, 30),
                expense.id
            );
        }
    }
}
