//! JSON file backed expense store
//!
//! Records live in memory in a `MemoryStore` and the whole collection is
//! rewritten to disk on every write. A write reaches memory, and so the
//! published snapshot, only after the file has been replaced.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use outlay_core::{Error, Expense, ExpenseStore, MemoryStore, StoreSnapshot};
use tokio::sync::watch;
use tracing::{debug, warn};

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    // serializes read-modify-save-commit
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Load the data file; a missing file is an empty store
    pub fn open(path: &Path) -> Result<Self> {
        let records: Vec<Expense> = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
        } else {
            Vec::new()
        };

        debug!(path = %path.display(), count = records.len(), "Opened expense data file");

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::with_records(records),
            write_lock: Mutex::new(()),
        })
    }

    /// Write all records, replacing the file atomically
    fn save(&self, records: &[Expense]) -> outlay_core::Result<()> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::Store(format!("Failed to encode records: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), count = records.len(), "Saved expense data file");
        Ok(())
    }

    /// Apply `change` to a copy of the records, save it, then publish it
    fn commit(
        &self,
        change: impl FnOnce(&mut Vec<Expense>) -> outlay_core::Result<()>,
    ) -> outlay_core::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut records = self.inner.records();
        change(&mut records)?;
        if let Err(e) = self.save(&records) {
            warn!(path = %self.path.display(), error = %e, "Failed to save expense data file");
            return Err(e);
        }
        self.inner.replace_all(records);
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for JsonFileStore {
    fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.inner.subscribe()
    }

    fn snapshot(&self) -> StoreSnapshot {
        self.inner.snapshot()
    }

    async fn insert(&self, expense: Expense) -> outlay_core::Result<()> {
        self.commit(|records| {
            if records.iter().any(|e| e.id == expense.id) {
                return Err(Error::Store(format!("duplicate expense id {}", expense.id)));
            }
            records.push(expense);
            Ok(())
        })
    }

    async fn update(&self, expense: Expense) -> outlay_core::Result<()> {
        self.commit(|records| {
            let slot = records
                .iter_mut()
                .find(|e| e.id == expense.id)
                .ok_or_else(|| Error::NotFound(format!("expense {}", expense.id)))?;
            *slot = expense;
            Ok(())
        })
    }

    async fn delete(&self, id: &str) -> outlay_core::Result<()> {
        self.commit(|records| {
            let before = records.len();
            records.retain(|e| e.id != id);
            if records.len() == before {
                return Err(Error::NotFound(format!("expense {}", id)));
            }
            Ok(())
        })
    }
}
