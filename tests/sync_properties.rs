use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use taskflow::color_utils;
use taskflow::dispatch::{Action, Dispatcher, NoticeLevel};
use taskflow::error::{StoreError, SyncError};
use taskflow::model::{Column, Priority, RowPosition, Task, TaskDraft, TaskStatus};
use taskflow::sound::Silent;
use taskflow::store::{MemoryStore, RowStore};
use taskflow::sync::SyncEngine;
use taskflow::view::{ViewState, project};

/// Fails the first read after every successful write, like a connection that
/// drops between the write and the reload.
#[derive(Clone)]
struct DropsReload {
    inner: MemoryStore,
    armed: Arc<AtomicBool>,
}

impl DropsReload {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl RowStore for DropsReload {
    async fn read_all(&self) -> Result<Vec<Task>, StoreError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            return Err(StoreError::unavailable("connection reset"));
        }
        self.inner.read_all().await
    }

    async fn insert_at_head(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let task = self.inner.insert_at_head(draft).await?;
        self.arm();
        Ok(task)
    }

    async fn update_cell(
        &self,
        pos: RowPosition,
        column: Column,
        value: &str,
    ) -> Result<(), StoreError> {
        self.inner.update_cell(pos, column, value).await?;
        self.arm();
        Ok(())
    }

    async fn delete_row(&self, pos: RowPosition) -> Result<(), StoreError> {
        self.inner.delete_row(pos).await?;
        self.arm();
        Ok(())
    }
}

fn row(name: &str, date: &str, status: TaskStatus, time: &str) -> Task {
    Task {
        task: name.to_string(),
        date: date.to_string(),
        status,
        priority: Some(Priority::LessImportant),
        created_time: time.to_string(),
        note: String::new(),
    }
}

fn mixed_store() -> MemoryStore {
    MemoryStore::with_rows(vec![
        row("e", "2024-01-02", TaskStatus::NotDone, "12:00:00"),
        row("d", "2024-01-01", TaskStatus::Done, "11:00:00"),
        row("c", "2024-01-01", TaskStatus::NotDone, "10:00:00"),
        row("b", "2024-01-02", TaskStatus::Done, "09:00:00"),
        row("a", "2024-01-01", TaskStatus::NotDone, "08:00:00"),
    ])
}

fn assert_invariants(view: &ViewState, expected: &[(RowPosition, Task)]) {
    assert_eq!(view.total, view.pending.len() + view.done.len());
    assert_eq!(view.done_count, view.done.len());
    assert!(view.pending.iter().all(|r| !r.task.status.is_done()));
    assert!(view.done.iter().all(|r| r.task.status.is_done()));

    let mut seen: Vec<(RowPosition, Task)> = view.rows().map(|r| (r.pos, r.task.clone())).collect();
    let mut want = expected.to_vec();
    seen.sort_by_key(|(p, _)| *p);
    want.sort_by_key(|(p, _)| *p);
    assert_eq!(seen, want);
}

#[tokio::test]
async fn add_then_refresh_round_trip() {
    let store = MemoryStore::new();
    let mut engine = SyncEngine::new(store);
    engine
        .add_task("Buy milk", "2024-01-01", Priority::Important)
        .await
        .unwrap();

    let snap = engine.refresh(None).await.unwrap();
    assert_eq!(snap.len(), 1);
    let t = &snap.rows[0].task;
    assert_eq!(t.task, "Buy milk");
    assert_eq!(t.date, "2024-01-01");
    assert_eq!(t.priority, Some(Priority::Important));
    assert_eq!(t.status, TaskStatus::NotDone);
    assert_eq!(t.note, "");
    assert_eq!(t.created_time.len(), "HH:MM:SS".len());
}

#[tokio::test]
async fn refresh_is_idempotent() {
    let mut engine = SyncEngine::new(mixed_store());
    let first = project(engine.refresh(Some("2024-01-01")).await.unwrap());
    let second = project(engine.refresh(Some("2024-01-01")).await.unwrap());
    assert_eq!(first, second);
    assert_eq!(first.total, 3);
}

#[tokio::test]
async fn partition_and_count_invariants() {
    let mut engine = SyncEngine::new(mixed_store());
    for filter in [None, Some("2024-01-01"), Some("2024-01-02"), Some("1999-12-31")] {
        let snap = engine.refresh(filter).await.unwrap();
        let expected: Vec<(RowPosition, Task)> =
            snap.iter().map(|r| (r.pos, r.task.clone())).collect();
        let view = project(snap);
        assert_invariants(&view, &expected);
    }
}

#[tokio::test]
async fn partitions_keep_oldest_first_order() {
    let mut engine = SyncEngine::new(mixed_store());
    let view = project(engine.refresh(None).await.unwrap());
    let pending: Vec<&str> = view.pending.iter().map(|r| r.task.task.as_str()).collect();
    let done: Vec<&str> = view.done.iter().map(|r| r.task.task.as_str()).collect();
    assert_eq!(pending, ["a", "c", "e"]);
    assert_eq!(done, ["b", "d"]);
}

#[tokio::test]
async fn toggle_symmetry() {
    let store = mixed_store();
    let mut engine = SyncEngine::new(store.clone());
    engine.refresh(None).await.unwrap();
    let original = store.rows()[2].clone();

    let snap = engine
        .set_status(RowPosition(2), TaskStatus::Done)
        .await
        .unwrap();
    let pos = snap
        .iter()
        .find(|r| r.task.key() == original.key())
        .map(|r| r.pos)
        .unwrap();

    engine.set_status(pos, TaskStatus::NotDone).await.unwrap();
    assert_eq!(store.rows()[2], original);
}

#[tokio::test]
async fn empty_store_with_filter() {
    let mut engine = SyncEngine::new(MemoryStore::new());
    let view = project(engine.refresh(Some("2024-01-01")).await.unwrap());
    assert_eq!(view, ViewState::default());
    assert_eq!(view.total, 0);
    assert_eq!(view.done_count, 0);
}

#[tokio::test]
async fn add_scenario_maps_priority_color() {
    let mut d = Dispatcher::new(SyncEngine::new(MemoryStore::new()), Box::new(Silent));
    d.dispatch(Action::SetFilter("2024-01-01".into())).await;
    d.form.task = "Buy milk".into();
    d.form.date = "2024-01-01".into();
    d.form.priority = Priority::Important;

    let view = d.dispatch(Action::Add).await;
    assert_eq!(view.total, 1);
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.pending[0].task.task, "Buy milk");
    assert_eq!(view.pending[0].color, color_utils::AMBER);
}

#[tokio::test]
async fn delete_only_task_then_retry_is_not_found() {
    let store = MemoryStore::with_rows(vec![row("only", "2024-01-01", TaskStatus::NotDone, "08:00:00")]);
    let mut engine = SyncEngine::new(store.clone());
    engine.refresh(None).await.unwrap();

    let snap = engine.delete_task(RowPosition(0)).await.unwrap();
    assert!(snap.is_empty());
    assert!(engine.refresh(None).await.unwrap().is_empty());

    let calls = store.calls();
    let err = engine.delete_task(RowPosition(0)).await.unwrap_err();
    assert_eq!(err, SyncError::NotFound(RowPosition(0)));
    assert_eq!(store.calls(), calls);
}

#[tokio::test]
async fn stale_delete_after_external_removal() {
    let store = mixed_store();
    let mut engine = SyncEngine::new(store.clone());
    engine.refresh(None).await.unwrap();

    // Another client deletes the row; its old position now holds a different task.
    let mut second = SyncEngine::new(store.clone());
    second.refresh(None).await.unwrap();
    second.delete_task(RowPosition(1)).await.unwrap();

    let before = store.rows();
    let err = engine.delete_task(RowPosition(1)).await.unwrap_err();
    assert_eq!(err, SyncError::NotFound(RowPosition(1)));
    assert_eq!(store.rows(), before);
}

#[tokio::test]
async fn dispatcher_survives_outage() {
    let store = mixed_store();
    let mut d = Dispatcher::new(SyncEngine::new(store.clone()), Box::new(Silent));
    d.dispatch(Action::Refresh).await;
    let before = d.view().clone();

    store.set_offline(true);
    for action in [
        Action::Refresh,
        Action::Delete(RowPosition(0)),
        Action::SetFilter("2024-01-02".into()),
    ] {
        let view = d.dispatch(action).await;
        assert_eq!(view, &before);
        assert!(d.notice().is_some());
    }

    store.set_offline(false);
    d.dispatch(Action::Refresh).await;
    assert!(d.notice().is_none());
    assert_eq!(d.view(), &before);
}

#[tokio::test]
async fn add_with_failed_reload_is_not_repeated() {
    let store = MemoryStore::new();
    let mut d = Dispatcher::new(SyncEngine::new(DropsReload::new(store.clone())), Box::new(Silent));
    d.dispatch(Action::Refresh).await;
    d.form.task = "Buy milk".into();
    d.form.date = "2024-01-01".into();

    d.dispatch(Action::Add).await;
    assert_eq!(store.rows().len(), 1);
    assert_eq!(d.form.task, "");
    let notice = d.notice().cloned().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("saved"), "{}", notice.text);
    assert_eq!(d.view().total, 0);

    // Pressing Enter again submits the now empty form.
    d.dispatch(Action::Add).await;
    assert_eq!(store.rows().len(), 1);

    d.dispatch(Action::Refresh).await;
    assert!(d.notice().is_none());
    assert_eq!(d.view().total, 1);
    assert_eq!(d.view().pending[0].task.task, "Buy milk");
}

#[tokio::test]
async fn toggle_with_failed_reload_is_idempotent_on_retry() {
    let store = MemoryStore::with_rows(vec![row("walk", "2024-01-01", TaskStatus::NotDone, "08:00:00")]);
    let mut d = Dispatcher::new(SyncEngine::new(DropsReload::new(store.clone())), Box::new(Silent));
    d.dispatch(Action::Refresh).await;

    d.dispatch(Action::Toggle(RowPosition(0))).await;
    assert_eq!(store.rows()[0].status, TaskStatus::Done);
    assert_eq!(d.view().done_count, 0);
    assert_eq!(d.notice().map(|n| n.level), Some(NoticeLevel::Error));

    // The stale view still shows the task pending, so the retry writes Done again.
    d.dispatch(Action::Toggle(RowPosition(0))).await;
    assert_eq!(store.rows()[0].status, TaskStatus::Done);

    d.dispatch(Action::Refresh).await;
    assert_eq!(d.view().done_count, 1);
    assert_eq!(d.view().pending.len(), 0);
}

#[tokio::test]
async fn delete_with_failed_reload_then_retry_is_not_found() {
    let store = MemoryStore::with_rows(vec![row("only", "2024-01-01", TaskStatus::NotDone, "08:00:00")]);
    let mut engine = SyncEngine::new(DropsReload::new(store.clone()));
    engine.refresh(None).await.unwrap();

    let err = engine.delete_task(RowPosition(0)).await.unwrap_err();
    assert!(matches!(err, SyncError::Unsynced(_)));
    assert!(err.is_applied());
    assert!(store.rows().is_empty());
    assert_eq!(engine.snapshot().unwrap().len(), 1);

    let err = engine.delete_task(RowPosition(0)).await.unwrap_err();
    assert_eq!(err, SyncError::NotFound(RowPosition(0)));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn failed_first_call_is_not_applied() {
    let store = mixed_store();
    let mut engine = SyncEngine::new(store.clone());
    engine.refresh(None).await.unwrap();

    store.set_offline(true);
    let err = engine.delete_task(RowPosition(0)).await.unwrap_err();
    assert!(!err.is_applied());
    store.set_offline(false);
    assert_eq!(store.rows().len(), 5);
}
