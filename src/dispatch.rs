// File: ./src/dispatch.rs
// Turns user intents into sync engine calls and keeps the rendered view in step.
use crate::error::SyncError;
use crate::model::{Priority, RowPosition, today_string};
use crate::sound::{SoundKind, SoundPlayer};
use crate::store::RowStore;
use crate::sync::{Snapshot, SyncEngine};
use crate::view::{self, ViewState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit the add form.
    Add,
    Toggle(RowPosition),
    Delete(RowPosition),
    OpenNote(RowPosition),
    SaveNote(String),
    CloseNote,
    SetFilter(String),
    Refresh,
}

/// The "new task" inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub task: String,
    pub date: String,
    pub priority: Priority,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            task: String::new(),
            date: today_string(),
            priority: Priority::default(),
        }
    }
}

impl TaskForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEditor {
    /// Position captured when the editor was opened.
    pub pos: RowPosition,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

pub struct Dispatcher<S> {
    engine: SyncEngine<S>,
    view: ViewState,
    pub form: TaskForm,
    editor: Option<NoteEditor>,
    notice: Option<Notice>,
    sound: Box<dyn SoundPlayer>,
}

impl<S: RowStore> Dispatcher<S> {
    pub fn new(engine: SyncEngine<S>, sound: Box<dyn SoundPlayer>) -> Self {
        Self {
            engine,
            view: ViewState::default(),
            form: TaskForm::default(),
            editor: None,
            notice: None,
            sound,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn editor(&self) -> Option<&NoteEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut NoteEditor> {
        self.editor.as_mut()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn filter(&self) -> Option<&str> {
        self.engine.filter()
    }

    /// Runs one action to completion. Errors never escape: they become a
    /// notice and the previous view stays on screen.
    pub async fn dispatch(&mut self, action: Action) -> &ViewState {
        tracing::debug!(?action, "dispatch");
        self.notice = None;
        if let Err(e) = self.apply(action).await {
            if e.is_silent() {
                tracing::debug!(error = %e, "action dropped");
            } else {
                tracing::warn!(error = %e, "action failed");
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
        &self.view
    }

    async fn apply(&mut self, action: Action) -> Result<(), SyncError> {
        match action {
            Action::Add => {
                let result = self
                    .engine
                    .add_task(&self.form.task, &self.form.date, self.form.priority)
                    .await;
                let reloaded = project_written(&mut self.view, result)?;
                // The row exists now; clear the form so Enter can't add it twice.
                self.form.reset();
                self.sound.play(SoundKind::Add);
                self.notice = Some(Notice::info("Task added successfully!"));
                reloaded?;
            }
            Action::Toggle(pos) => {
                let next = self
                    .engine
                    .row(pos)
                    .ok_or(SyncError::NotFound(pos))?
                    .status
                    .flip();
                let result = self.engine.set_status(pos, next).await;
                let reloaded = project_written(&mut self.view, result)?;
                if next.is_done() {
                    self.sound.play(SoundKind::Done);
                }
                reloaded?;
            }
            Action::Delete(pos) => {
                let result = self.engine.delete_task(pos).await;
                project_written(&mut self.view, result)??;
            }
            Action::OpenNote(pos) => {
                let task = self.engine.row(pos).ok_or(SyncError::NotFound(pos))?;
                self.editor = Some(NoteEditor {
                    pos,
                    title: format!("Notes for: {}", task.task),
                    text: task.note.clone(),
                });
            }
            Action::SaveNote(text) => {
                let Some(pos) = self.editor.as_ref().map(|e| e.pos) else {
                    tracing::debug!("save requested with no editor open");
                    return Ok(());
                };
                let result = self.engine.set_note(pos, &text).await;
                match project_written(&mut self.view, result) {
                    Ok(reloaded) => {
                        self.editor = None;
                        reloaded?;
                    }
                    Err(e) => {
                        // Keep the editor open so the text isn't lost.
                        if let Some(editor) = self.editor.as_mut() {
                            editor.text = text;
                        }
                        return Err(e);
                    }
                }
            }
            Action::CloseNote => {
                self.editor = None;
            }
            Action::SetFilter(date) => {
                let snapshot = self.engine.refresh(Some(&date)).await?;
                self.view = view::project(snapshot);
            }
            Action::Refresh => {
                let filter = self.engine.filter().map(str::to_string);
                let snapshot = self.engine.refresh(filter.as_deref()).await?;
                self.view = view::project(snapshot);
            }
        }
        Ok(())
    }
}

/// Outer error: the write never happened. Inner error: it did, but the view
/// could not be reloaded and keeps showing the previous state.
fn project_written(
    target: &mut ViewState,
    result: Result<&Snapshot, SyncError>,
) -> Result<Result<(), SyncError>, SyncError> {
    match result {
        Ok(snapshot) => {
            *target = view::project(snapshot);
            Ok(Ok(()))
        }
        Err(e) if e.is_applied() => Ok(Err(e)),
        Err(e) => Err(e),
    }
}
