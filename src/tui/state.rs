// File: src/tui/state.rs
use crate::model::RowPosition;
use crate::view::ViewState;
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Task,
    Date,
    Priority,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Task => FormField::Date,
            FormField::Date => FormField::Priority,
            FormField::Priority => FormField::Task,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Task => FormField::Priority,
            FormField::Date => FormField::Task,
            FormField::Priority => FormField::Date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding(FormField),
    Filtering,
    EditingNote,
}

pub struct AppState {
    pub mode: InputMode,
    /// Index into pending rows followed by done rows.
    pub selected: usize,
    pub pending_state: ListState,
    pub done_state: ListState,
    pub filter_input: String,
    pub clock: String,
    pub busy: bool,
    pub show_full_help: bool,
}

impl AppState {
    pub fn new(filter: &str, clock: String) -> Self {
        Self {
            mode: InputMode::Normal,
            selected: 0,
            pending_state: ListState::default(),
            done_state: ListState::default(),
            filter_input: filter.to_string(),
            clock,
            busy: false,
            show_full_help: false,
        }
    }

    pub fn next(&mut self, view: &ViewState) {
        if self.selected + 1 < view.total {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keeps the cursor on a real row after the view shrank.
    pub fn clamp(&mut self, view: &ViewState) {
        self.selected = self.selected.min(view.total.saturating_sub(1));
    }

    pub fn selected_pos(&self, view: &ViewState) -> Option<RowPosition> {
        view.rows().nth(self.selected).map(|r| r.pos)
    }

    /// Points the two list widgets at the selected row.
    pub fn sync_list_states(&mut self, view: &ViewState) {
        let pending = view.pending.len();
        if view.total == 0 {
            self.pending_state.select(None);
            self.done_state.select(None);
        } else if self.selected < pending {
            self.pending_state.select(Some(self.selected));
            self.done_state.select(None);
        } else {
            self.pending_state.select(None);
            self.done_state.select(Some(self.selected - pending));
        }
    }
}
