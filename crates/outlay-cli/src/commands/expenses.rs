//! Expense write commands (add, update, delete)

use anyhow::{Context, Result};
use outlay_core::{AddOutcome, ExpenseService, InsertMode, NewExpense};

use super::{current_records, parse_amount, parse_category};

#[allow(clippy::too_many_arguments)]
pub async fn cmd_add(
    service: &ExpenseService,
    title: &str,
    amount: &str,
    category: &str,
    description: Option<&str>,
    recurring: bool,
    force: bool,
    currency: &str,
) -> Result<()> {
    let mut draft = NewExpense::new(title, parse_amount(amount)?, parse_category(category)?)
        .recurring(recurring);
    if let Some(description) = description {
        draft = draft.description(description);
    }

    let mode = if force {
        InsertMode::Force
    } else {
        InsertMode::Checked
    };

    match service.add(draft, mode).await.context("Failed to add expense")? {
        AddOutcome::Added(expense) => {
            println!(
                "✅ Added {} ({}{:.2}, {})",
                expense.title,
                currency,
                expense.amount,
                expense.category.display_name()
            );
            println!("   id: {}", expense.id);
        }
        AddOutcome::DuplicateSuspected { existing } => {
            println!(
                "⚠️  Looks like a duplicate of today's \"{}\" ({}{:.2}, logged at {})",
                existing.title,
                currency,
                existing.amount,
                existing.timestamp.format("%H:%M")
            );
            println!("   Nothing was added. Re-run with --force to add it anyway.");
        }
    }

    Ok(())
}

pub async fn cmd_update(
    service: &ExpenseService,
    id: &str,
    title: Option<&str>,
    amount: Option<&str>,
    category: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let records = current_records(service.store().as_ref())?;
    let mut expense = records
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Expense {} not found", id))?;

    if let Some(title) = title {
        expense.title = title.to_string();
    }
    if let Some(amount) = amount {
        expense.amount = parse_amount(amount)?;
    }
    if let Some(category) = category {
        expense.category = parse_category(category)?;
    }
    if let Some(description) = description {
        expense.description = if description.trim().is_empty() {
            None
        } else {
            Some(description.to_string())
        };
    }

    let updated = service
        .update(expense)
        .await
        .context("Failed to update expense")?;
    println!("✅ Updated {} ({})", updated.title, updated.id);
    Ok(())
}

pub async fn cmd_delete(service: &ExpenseService, id: &str) -> Result<()> {
    service
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete expense {}", id))?;
    println!("🗑️  Deleted expense {}", id);
    Ok(())
}
