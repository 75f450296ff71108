//! Write path for expenses
//!
//! Validates drafts, consults the duplicate guard and forwards inserts,
//! updates and deletes to the store keyed by id.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::duplicate::{self, DuplicateGuard};
use crate::error::Result;
use crate::models::{Expense, NewExpense};
use crate::store::ExpenseStore;

/// Whether an insert should stop at a suspected duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    #[default]
    Checked,
    /// Skip the duplicate check (the user confirmed the repeat)
    Force,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(Expense),
    /// Nothing was written; retry with `InsertMode::Force` to insert anyway
    DuplicateSuspected { existing: Expense },
}

pub struct ExpenseService {
    store: Arc<dyn ExpenseStore>,
    clock: Arc<dyn Clock>,
    guard: DuplicateGuard,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn ExpenseStore>, clock: Arc<dyn Clock>, guard: DuplicateGuard) -> Self {
        Self {
            store,
            clock,
            guard,
        }
    }

    pub fn store(&self) -> &Arc<dyn ExpenseStore> {
        &self.store
    }

    pub async fn add(&self, draft: NewExpense, mode: InsertMode) -> Result<AddOutcome> {
        duplicate::validate(&draft)?;

        if mode == InsertMode::Checked {
            let snapshot = self.store.snapshot();
            if let Some(existing) = self.guard.check(&draft, &snapshot, self.clock.today()) {
                return Ok(AddOutcome::DuplicateSuspected { existing });
            }
        }

        let expense = draft.into_expense(Uuid::new_v4().to_string(), self.clock.now());
        self.store.insert(expense.clone()).await?;

        let forced = mode == InsertMode::Force;
        info!(
            id = %expense.id,
            amount = %expense.amount,
            category = expense.category.id(),
            forced,
            "Added expense"
        );
        Ok(AddOutcome::Added(expense))
    }

    /// Replace the record with the same id
    pub async fn update(&self, mut expense: Expense) -> Result<Expense> {
        duplicate::validate_fields(&expense.title, expense.amount)?;
        expense.title = expense.title.trim().to_string();

        self.store.update(expense.clone()).await?;
        info!(id = %expense.id, "Updated expense");
        Ok(expense)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        match self.store.delete(id).await {
            Ok(()) => {
                info!(id = %id, "Deleted expense");
                Ok(())
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Delete failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::Error;
    use crate::models::Category;
    use crate::store::MemoryStore;
    use crate::test_utils::{at, expense, money};

    fn service_with(records: Vec<Expense>) -> (ExpenseService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_records(records));
        let clock = Arc::new(FixedClock::new(at(2024, 6, 12, 18, 30)));
        let service = ExpenseService::new(store.clone(), clock, DuplicateGuard::default());
        (service, store)
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_timestamp() {
        let (service, store) = service_with(Vec::new());
        let draft = NewExpense::new("  Groceries ", money("54.20"), Category::Food);

        let outcome = service.add(draft, InsertMode::Checked).await.unwrap();
        let AddOutcome::Added(added) = outcome else {
            panic!("expected insert");
        };

        assert_eq!(added.title, "Groceries");
        assert_eq!(added.timestamp, at(2024, 6, 12, 18, 30));
        assert!(Uuid::parse_str(&added.id).is_ok());
        assert_eq!(store.records(), vec![added]);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_draft() {
        let (service, store) = service_with(Vec::new());
        let draft = NewExpense::new("", money("10"), Category::Food);

        let err = service.add(draft, InsertMode::Force).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_then_force() {
        let existing = expense("Coffee", "4.50", Category::Food, at(2024, 6, 12, 8, 0));
        let (service, store) = service_with(vec![existing.clone()]);
        let draft = NewExpense::new("coffee", money("4.50"), Category::Food);

        let outcome = service.add(draft.clone(), InsertMode::Checked).await.unwrap();
        assert_eq!(outcome, AddOutcome::DuplicateSuspected { existing });
        assert_eq!(store.records().len(), 1);

        let outcome = service.add(draft, InsertMode::Force).await.unwrap();
        assert!(matches!(outcome, AddOutcome::Added(_)));
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let record = expense("Hotel", "210", Category::Travel, at(2024, 6, 10, 22, 0));
        let (service, store) = service_with(vec![record.clone()]);

        let mut changed = record.clone();
        changed.amount = money("190");
        service.update(changed).await.unwrap();
        assert_eq!(store.records()[0].amount, money("190"));

        service.delete(&record.id).await.unwrap();
        assert!(matches!(
            service.delete(&record.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_non_positive_amount() {
        let record = expense("Hotel", "210", Category::Travel, at(2024, 6, 10, 22, 0));
        let (service, _store) = service_with(vec![record.clone()]);

        let mut changed = record;
        changed.amount = money("0");
        assert!(matches!(
            service.update(changed).await,
            Err(Error::Validation(_))
        ));
    }
}
