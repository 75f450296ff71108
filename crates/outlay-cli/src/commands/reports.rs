//! Report command implementations

use anyhow::{Context, Result};
use outlay_core::reports::today_summary;
use outlay_core::{Clock, EngineConfig, ExpenseStore, ReportState, YearMonth};

use super::current_records;

/// `YYYY-MM`, or the month containing today
pub fn resolve_period(period: Option<&str>, clock: &dyn Clock) -> Result<YearMonth> {
    match period {
        Some(p) => p.parse::<YearMonth>().context("Invalid --period"),
        None => Ok(YearMonth::from_date(clock.today())),
    }
}

pub fn cmd_report(
    store: &dyn ExpenseStore,
    config: &EngineConfig,
    clock: &dyn Clock,
    period: YearMonth,
) -> Result<()> {
    let records = current_records(store)?;
    let state = config.report_engine().build(&records, period, clock.today());
    print_report(&state, &config.currency_symbol);
    Ok(())
}

fn print_report(state: &ReportState, currency: &str) {
    println!();
    println!("📊 Last 7 Days");
    println!("   ─────────────────────────────────────────────────────────────");
    for day in &state.daily_series {
        println!(
            "   {} │ {:>10} │ {} expense(s)",
            day.label(),
            format!("{}{:.2}", currency, day.total_amount),
            day.expense_count
        );
    }
    println!("   Total: {}{:.2}", currency, state.last_7_days_total);

    if !state.category_series.is_empty() {
        println!();
        println!("🏷️  By Category (7 days)");
        println!("   ─────────────────────────────────────────────────────────────");
        for entry in &state.category_series {
            println!(
                "   {:<18} │ {:>10} │ {:>5.1}% │ {} expense(s)",
                entry.category.display_name(),
                format!("{}{:.2}", currency, entry.total_amount),
                entry.percentage,
                entry.expense_count
            );
        }
    }

    let report = &state.monthly_report;
    println!();
    println!("📅 Month {}", report.period);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total:         {}{:.2}", currency, report.total_expenses);
    println!("   Expenses:      {}", report.expense_count);
    println!("   Daily average: {}{:.2}", currency, report.average_daily);
    if !report.top_categories.is_empty() {
        println!("   Top categories:");
        for top in &report.top_categories {
            println!(
                "     • {:<18} {}{:.2}",
                top.category.display_name(),
                currency,
                top.amount
            );
        }
    }

    if state.monthly_trends.len() > 1 {
        println!();
        println!("📈 Monthly Trend");
        println!("   ─────────────────────────────────────────────────────────────");
        for trend in &state.monthly_trends {
            println!(
                "   {} │ {:>10} │ {} expense(s)",
                trend.month,
                format!("{}{:.2}", currency, trend.total_amount),
                trend.expense_count
            );
        }
    }
}

pub fn cmd_summary(store: &dyn ExpenseStore, config: &EngineConfig, clock: &dyn Clock) -> Result<()> {
    let records = current_records(store)?;
    let now = clock.now();
    let currency = &config.currency_symbol;

    let today = today_summary(&records, now.date());
    println!();
    println!(
        "💰 Today: {}{:.2} across {} expense(s)",
        currency, today.total_amount, today.expense_count
    );

    let top = config
        .report_engine()
        .top_categories_for_month(&records, YearMonth::from_date(now.date()));
    if !top.is_empty() {
        println!("   Top categories this month:");
        for entry in top {
            println!(
                "     • {:<18} {}{:.2}",
                entry.category.display_name(),
                currency,
                entry.amount
            );
        }
    }

    println!();
    print!("{}", config.export_formatter().share_summary(&records, now));
    Ok(())
}
