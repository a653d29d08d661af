// File: ./src/view.rs
// Pure projection of a snapshot into what the UI draws.
use crate::color_utils::{self, Rgb};
use crate::model::{RowPosition, Task};
use crate::sync::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub pos: RowPosition,
    pub task: Task,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub pending: Vec<ViewRow>,
    pub done: Vec<ViewRow>,
    pub total: usize,
    pub done_count: usize,
}

impl ViewState {
    pub fn pending_count(&self) -> usize {
        self.total - self.done_count
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Done: {} | Pending: {}",
            self.total,
            self.done_count,
            self.pending_count()
        )
    }

    /// Pending rows followed by done rows, the order the UI lists them in.
    pub fn rows(&self) -> impl Iterator<Item = &ViewRow> {
        self.pending.iter().chain(self.done.iter())
    }
}

/// Splits the snapshot by status, keeping snapshot order inside each half.
pub fn project(snapshot: &Snapshot) -> ViewState {
    let (done, pending): (Vec<ViewRow>, Vec<ViewRow>) = snapshot
        .iter()
        .map(|r| ViewRow {
            pos: r.pos,
            task: r.task.clone(),
            color: color_utils::priority_color(r.task.priority),
        })
        .partition(|r| r.task.status.is_done());

    ViewState {
        total: snapshot.len(),
        done_count: done.len(),
        pending,
        done,
    }
}
