// File: ./src/store.rs
// The row store boundary: everything the sync engine needs from the sheet.
use crate::error::StoreError;
use crate::model::{Column, RowPosition, Task, TaskDraft, now_time_string};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// A table of task rows addressed by position.
///
/// Every call only returns once the remote side reflects the change; the
/// sync engine relies on that when it re-reads right after a mutation.
pub trait RowStore {
    /// Every data row, in store order (most recent insert first).
    fn read_all(&self) -> impl Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Inserts directly under the header, stamping the creation time.
    /// Returns the row as written.
    fn insert_at_head(
        &self,
        draft: &TaskDraft,
    ) -> impl Future<Output = Result<Task, StoreError>> + Send;

    fn update_cell(
        &self,
        pos: RowPosition,
        column: Column,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes the row; every later position shifts down by one.
    fn delete_row(&self, pos: RowPosition) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store with the same semantics as the sheet. Clones share rows,
/// so a test can keep a handle while the engine owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    rows: Vec<Task>,
    offline: bool,
    calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store; `rows[0]` is the row right under the header.
    pub fn with_rows(rows: Vec<Task>) -> Self {
        let store = Self::default();
        store.lock().rows = rows;
        store
    }

    pub fn rows(&self) -> Vec<Task> {
        self.lock().rows.clone()
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of calls made against the store, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Simulates another client touching the sheet between our refreshes.
    pub fn insert_external(&self, task: Task) {
        self.lock().rows.insert(0, task);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned lock only means a test panicked mid-call; the rows are still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        let mut inner = self.lock();
        inner.calls += 1;
        if inner.offline {
            return Err(StoreError::unavailable("memory store is offline"));
        }
        Ok(inner)
    }
}

impl RowStore for MemoryStore {
    async fn read_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.begin()?.rows.clone())
    }

    async fn insert_at_head(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let mut inner = self.begin()?;
        let task = draft.clone().into_task(now_time_string());
        inner.rows.insert(0, task.clone());
        Ok(task)
    }

    async fn update_cell(
        &self,
        pos: RowPosition,
        column: Column,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.begin()?;
        let row = inner
            .rows
            .get_mut(pos.0)
            .ok_or_else(|| StoreError::unavailable(format!("row {} out of range", pos)))?;
        row.apply_cell(column, value);
        Ok(())
    }

    async fn delete_row(&self, pos: RowPosition) -> Result<(), StoreError> {
        let mut inner = self.begin()?;
        if pos.0 >= inner.rows.len() {
            return Err(StoreError::unavailable(format!(
                "row {} out of range",
                pos
            )));
        }
        inner.rows.remove(pos.0);
        Ok(())
    }
}
