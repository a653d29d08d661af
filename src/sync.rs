// File: ./src/sync.rs
// Owns the snapshot and turns mutations into store calls followed by a full re-read.
use crate::error::SyncError;
use crate::model::{Column, Priority, RowPosition, Task, TaskDraft, TaskStatus, today_string};
use crate::store::RowStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub pos: RowPosition,
    pub task: Task,
}

/// The filtered store content as of the last refresh, oldest insert first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// Store rows arrive newest-first; reverse them, then keep the ones
    /// matching `filter` exactly on date.
    pub fn build(store_rows: Vec<Task>, filter: Option<&str>) -> Self {
        let mut rows: Vec<SnapshotRow> = store_rows
            .into_iter()
            .enumerate()
            .map(|(i, task)| SnapshotRow {
                pos: RowPosition(i),
                task,
            })
            .filter(|r| filter.is_none_or(|d| r.task.date == d))
            .collect();
        rows.reverse();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, pos: RowPosition) -> Option<&Task> {
        self.rows.iter().find(|r| r.pos == pos).map(|r| &r.task)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotRow> {
        self.rows.iter()
    }
}

fn normalize_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

pub struct SyncEngine<S> {
    store: S,
    snapshot: Option<Snapshot>,
    filter: Option<String>,
}

impl<S: RowStore> SyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            snapshot: None,
            filter: None,
        }
    }

    /// `None` until the first successful refresh.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn row(&self, pos: RowPosition) -> Option<&Task> {
        self.snapshot.as_ref().and_then(|s| s.get(pos))
    }

    /// Re-reads the whole store and replaces the snapshot. A blank filter
    /// shows every row. On failure the previous snapshot and filter stay.
    pub async fn refresh(&mut self, filter: Option<&str>) -> Result<&Snapshot, SyncError> {
        let filter = normalize_filter(filter);
        let rows = self.store.read_all().await?;
        let snapshot = Snapshot::build(rows, filter.as_deref());
        tracing::debug!(
            filter = filter.as_deref().unwrap_or("*"),
            rows = snapshot.len(),
            "refreshed"
        );
        self.filter = filter;
        Ok(&*self.snapshot.insert(snapshot))
    }

    /// Re-reads after a write that already landed. A failure here is
    /// reported as [`SyncError::Unsynced`] so callers don't retry the write.
    async fn refresh_after_write(&mut self) -> Result<&Snapshot, SyncError> {
        let filter = self.filter.clone();
        self.refresh(filter.as_deref()).await.map_err(|e| match e {
            SyncError::Store(inner) => {
                tracing::warn!(error = %inner, "write applied, reload failed");
                SyncError::Unsynced(inner)
            }
            other => other,
        })
    }

    pub async fn add_task(
        &mut self,
        task: &str,
        date: &str,
        priority: Priority,
    ) -> Result<&Snapshot, SyncError> {
        let name = task.trim();
        if name.is_empty() {
            return Err(SyncError::EmptyTaskName);
        }
        let date = match date.trim() {
            "" => today_string(),
            d => d.to_string(),
        };
        let draft = TaskDraft {
            task: name.to_string(),
            date,
            priority,
        };
        self.store.insert_at_head(&draft).await?;
        self.refresh_after_write().await
    }

    pub async fn set_status(
        &mut self,
        pos: RowPosition,
        status: TaskStatus,
    ) -> Result<&Snapshot, SyncError> {
        let target = self.resolve(pos).await?;
        self.store
            .update_cell(target, Column::Status, status.as_cell())
            .await?;
        self.refresh_after_write().await
    }

    pub async fn set_note(&mut self, pos: RowPosition, note: &str) -> Result<&Snapshot, SyncError> {
        let target = self.resolve(pos).await?;
        self.store.update_cell(target, Column::Note, note).await?;
        self.refresh_after_write().await
    }

    pub async fn delete_task(&mut self, pos: RowPosition) -> Result<&Snapshot, SyncError> {
        let target = self.resolve(pos).await?;
        self.store.delete_row(target).await?;
        self.refresh_after_write().await
    }

    /// Maps a position from the current snapshot to the row's position in the
    /// store right now. The row must be in the snapshot, and a task with the
    /// same name and creation time must still exist; if rows moved since the
    /// last refresh, the task is located again by that identity.
    ///
    /// Two tasks with the same name added within the same second share a key.
    /// Among several candidates, a row identical to the snapshot copy wins,
    /// then the one closest to the old position.
    pub async fn resolve(&self, pos: RowPosition) -> Result<RowPosition, SyncError> {
        let expected = self.row(pos).ok_or(SyncError::NotFound(pos))?;
        let key = expected.key();
        let rows = self.store.read_all().await?;

        let found = rows
            .iter()
            .enumerate()
            .filter(|(_, t)| t.key() == key)
            .min_by_key(|(i, t)| (*t != expected, i.abs_diff(pos.0)))
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                if i != pos.0 {
                    tracing::debug!(from = %pos, to = i, "row moved since last refresh");
                }
                Ok(RowPosition(i))
            }
            None => Err(SyncError::NotFound(pos)),
        }
    }
}
