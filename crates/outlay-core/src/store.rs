//! Expense store collaborator
//!
//! The engine reads the current record collection through [`ExpenseStore`]
//! and never mutates it. Writes go through the store's own path, and every
//! accepted write publishes a fresh snapshot that downstream feeds pick up.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Expense;

/// The store's current view of the record collection
#[derive(Debug, Clone)]
pub enum StoreSnapshot {
    /// No read has completed yet
    Loading,
    /// Full record set, in no particular order
    Ready(Arc<Vec<Expense>>),
    /// The last read failed
    Failed(String),
}

impl StoreSnapshot {
    pub fn records(&self) -> Option<&[Expense]> {
        match self {
            StoreSnapshot::Ready(records) => Some(records.as_slice()),
            _ => None,
        }
    }
}

/// Observable record collection with an id-keyed write path
///
/// Implementations must publish a new snapshot after each successful write.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Stream of snapshots; the receiver starts at the current one
    fn subscribe(&self) -> watch::Receiver<StoreSnapshot>;

    /// Current snapshot without waiting
    fn snapshot(&self) -> StoreSnapshot {
        self.subscribe().borrow().clone()
    }

    async fn insert(&self, expense: Expense) -> Result<()>;

    async fn update(&self, expense: Expense) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-process store backed by a vector
///
/// Snapshots are published while the record lock is held, so subscribers
/// see them in write order.
pub struct MemoryStore {
    records: Mutex<Vec<Expense>>,
    tx: watch::Sender<StoreSnapshot>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store, already loaded
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<Expense>) -> Self {
        let (tx, _rx) = watch::channel(StoreSnapshot::Ready(Arc::new(records.clone())));
        Self {
            records: Mutex::new(records),
            tx,
        }
    }

    /// Store whose first read has not completed
    pub fn loading() -> Self {
        let (tx, _rx) = watch::channel(StoreSnapshot::Loading);
        Self {
            records: Mutex::new(Vec::new()),
            tx,
        }
    }

    /// Replace the whole collection, as a completed upstream read would
    pub fn replace_all(&self, records: Vec<Expense>) {
        let mut guard = self.lock();
        *guard = records;
        self.publish(&guard);
    }

    /// Publish a read failure; stored records are left untouched
    pub fn publish_failure(&self, message: impl Into<String>) {
        let message = message.into();
        let _guard = self.lock();
        warn!(error = %message, "Expense store read failed");
        self.tx.send_replace(StoreSnapshot::Failed(message));
    }

    /// Current records, regardless of the published snapshot
    pub fn records(&self) -> Vec<Expense> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Expense>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, records: &[Expense]) {
        debug!(count = records.len(), "Publishing store snapshot");
        self.tx
            .send_replace(StoreSnapshot::Ready(Arc::new(records.to_vec())));
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    async fn insert(&self, expense: Expense) -> Result<()> {
        let mut records = self.lock();
        if records.iter().any(|e| e.id == expense.id) {
            return Err(Error::Store(format!("duplicate expense id {}", expense.id)));
        }
        records.push(expense);
        self.publish(&records);
        Ok(())
    }

    async fn update(&self, expense: Expense) -> Result<()> {
        let mut records = self.lock();
        let slot = records
            .iter_mut()
            .find(|e| e.id == expense.id)
            .ok_or_else(|| Error::NotFound(format!("expense {}", expense.id)))?;
        *slot = expense;
        self.publish(&records);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|e| e.id != id);
        if records.len() == before {
            return Err(Error::NotFound(format!("expense {}", id)));
        }
        self.publish(&records);
        Ok(())
    }
}
