//! Insert-boundary checks
//!
//! - Validation: blank titles and non-positive amounts never reach the store
//! - Duplicate detection: advisory flag for a same-day repeat of an expense

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};
use crate::store::StoreSnapshot;

/// Reject drafts that must not be inserted
pub fn validate(draft: &NewExpense) -> Result<()> {
    validate_fields(&draft.title, draft.amount)
}

/// Title must be non-blank and amount strictly positive
pub fn validate_fields(title: &str, amount: Decimal) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be blank".into()));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

/// First record dated `today` that matches the candidate
///
/// A match has the same trimmed, case-insensitive title, the exact same
/// amount and the same category.
pub fn find_duplicate<'a>(
    candidate: &NewExpense,
    records: &'a [Expense],
    today: NaiveDate,
) -> Option<&'a Expense> {
    let title = normalize_title(&candidate.title);
    records.iter().find(|e| {
        e.date() == today
            && e.amount == candidate.amount
            && e.category.id() == candidate.category.id()
            && normalize_title(&e.title) == title
    })
}

pub fn is_duplicate(candidate: &NewExpense, todays_records: &[Expense], today: NaiveDate) -> bool {
    find_duplicate(candidate, todays_records, today).is_some()
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Duplicate check against a store snapshot
///
/// Fails open: when the snapshot is not readable the candidate is treated
/// as new.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateGuard {
    enabled: bool,
}

impl Default for DuplicateGuard {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl DuplicateGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The existing record the candidate probably repeats, if any
    pub fn check(
        &self,
        candidate: &NewExpense,
        snapshot: &StoreSnapshot,
        today: NaiveDate,
    ) -> Option<Expense> {
        if !self.enabled {
            return None;
        }

        match snapshot {
            StoreSnapshot::Ready(records) => {
                let found = find_duplicate(candidate, records, today).cloned();
                if let Some(existing) = &found {
                    warn!(
                        id = %existing.id,
                        title = %existing.title,
                        amount = %existing.amount,
                        "Possible duplicate expense"
                    );
                }
                found
            }
            StoreSnapshot::Loading => {
                debug!("Store still loading, skipping duplicate check");
                None
            }
            StoreSnapshot::Failed(message) => {
                warn!(error = %message, "Duplicate check skipped, store unreadable");
                None
            }
        }
    }
}
