// File: src/tui/action.rs
// Maps key presses to dispatcher actions and local input edits.
use crate::dispatch::{Action, Dispatcher};
use crate::store::RowStore;
use crate::tui::state::{AppState, FormField, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Dispatch(Action),
    Quit,
}

pub fn handle_key<S: RowStore>(
    state: &mut AppState,
    dispatcher: &mut Dispatcher<S>,
    key: KeyEvent,
) -> KeyOutcome {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyOutcome::Quit;
    }

    match state.mode {
        InputMode::Normal => handle_normal(state, dispatcher, key),
        InputMode::Adding(field) => handle_form(state, dispatcher, field, key),
        InputMode::Filtering => handle_filter(state, dispatcher, key),
        InputMode::EditingNote => handle_note(dispatcher, key),
    }
}

fn handle_normal<S: RowStore>(
    state: &mut AppState,
    dispatcher: &mut Dispatcher<S>,
    key: KeyEvent,
) -> KeyOutcome {
    let selected = state.selected_pos(dispatcher.view());
    match key.code {
        KeyCode::Char('q') => KeyOutcome::Quit,
        KeyCode::Esc => {
            dispatcher.clear_notice();
            KeyOutcome::Continue
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.next(dispatcher.view());
            KeyOutcome::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.previous();
            KeyOutcome::Continue
        }
        KeyCode::Char('a') => {
            state.mode = InputMode::Adding(FormField::Task);
            KeyOutcome::Continue
        }
        KeyCode::Char('f') => {
            state.filter_input = dispatcher.filter().unwrap_or_default().to_string();
            state.mode = InputMode::Filtering;
            KeyOutcome::Continue
        }
        KeyCode::Char('?') => {
            state.show_full_help = !state.show_full_help;
            KeyOutcome::Continue
        }
        KeyCode::Char('r') => KeyOutcome::Dispatch(Action::Refresh),
        KeyCode::Char(' ') => selected
            .map(|p| KeyOutcome::Dispatch(Action::Toggle(p)))
            .unwrap_or(KeyOutcome::Continue),
        KeyCode::Char('d') => selected
            .map(|p| KeyOutcome::Dispatch(Action::Delete(p)))
            .unwrap_or(KeyOutcome::Continue),
        KeyCode::Char('n') => selected
            .map(|p| KeyOutcome::Dispatch(Action::OpenNote(p)))
            .unwrap_or(KeyOutcome::Continue),
        _ => KeyOutcome::Continue,
    }
}

fn handle_form<S: RowStore>(
    state: &mut AppState,
    dispatcher: &mut Dispatcher<S>,
    field: FormField,
    key: KeyEvent,
) -> KeyOutcome {
    let form = &mut dispatcher.form;
    match key.code {
        KeyCode::Esc => state.mode = InputMode::Normal,
        KeyCode::Tab => state.mode = InputMode::Adding(field.next()),
        KeyCode::BackTab => state.mode = InputMode::Adding(field.prev()),
        KeyCode::Enter => return KeyOutcome::Dispatch(Action::Add),
        KeyCode::Left if field == FormField::Priority => form.priority = form.priority.lower(),
        KeyCode::Right if field == FormField::Priority => form.priority = form.priority.raise(),
        KeyCode::Char(c) => match field {
            FormField::Task => form.task.push(c),
            FormField::Date => form.date.push(c),
            FormField::Priority => {}
        },
        KeyCode::Backspace => match field {
            FormField::Task => {
                form.task.pop();
            }
            FormField::Date => {
                form.date.pop();
            }
            FormField::Priority => {}
        },
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_filter<S: RowStore>(
    state: &mut AppState,
    dispatcher: &mut Dispatcher<S>,
    key: KeyEvent,
) -> KeyOutcome {
    match key.code {
        KeyCode::Esc => {
            state.filter_input = dispatcher.filter().unwrap_or_default().to_string();
            state.mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            state.mode = InputMode::Normal;
            state.selected = 0;
            return KeyOutcome::Dispatch(Action::SetFilter(state.filter_input.clone()));
        }
        KeyCode::Char(c) => state.filter_input.push(c),
        KeyCode::Backspace => {
            state.filter_input.pop();
        }
        _ => {}
    }
    KeyOutcome::Continue
}

fn handle_note<S: RowStore>(dispatcher: &mut Dispatcher<S>, key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Esc => KeyOutcome::Dispatch(Action::CloseNote),
        KeyCode::Enter => dispatcher
            .editor()
            .map(|e| KeyOutcome::Dispatch(Action::SaveNote(e.text.clone())))
            .unwrap_or(KeyOutcome::Continue),
        KeyCode::Char(c) => {
            if let Some(editor) = dispatcher.editor_mut() {
                editor.text.push(c);
            }
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            if let Some(editor) = dispatcher.editor_mut() {
                editor.text.pop();
            }
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// Puts the mode back in line with the dispatcher after an action ran.
pub fn after_dispatch<S: RowStore>(state: &mut AppState, dispatcher: &Dispatcher<S>) {
    state.mode = match (state.mode, dispatcher.editor().is_some()) {
        (_, true) => InputMode::EditingNote,
        (InputMode::EditingNote, false) => InputMode::Normal,
        // A successful add resets the form, which closes it.
        (InputMode::Adding(_), false) if dispatcher.form.task.is_empty() => InputMode::Normal,
        (mode, false) => mode,
    };
    state.clamp(dispatcher.view());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::Silent;
    use crate::store::MemoryStore;
    use crate::sync::SyncEngine;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn dispatcher() -> Dispatcher<MemoryStore> {
        Dispatcher::new(SyncEngine::new(MemoryStore::new()), Box::new(Silent))
    }

    #[test]
    fn typing_into_the_form() {
        let mut d = dispatcher();
        let mut s = AppState::new("", String::new());
        d.form.date.clear();

        handle_key(&mut s, &mut d, key(KeyCode::Char('a')));
        for c in "hi".chars() {
            handle_key(&mut s, &mut d, key(KeyCode::Char(c)));
        }
        handle_key(&mut s, &mut d, key(KeyCode::Tab));
        handle_key(&mut s, &mut d, key(KeyCode::Char('7')));
        handle_key(&mut s, &mut d, key(KeyCode::Tab));
        handle_key(&mut s, &mut d, key(KeyCode::Right));

        assert_eq!(d.form.task, "hi");
        assert_eq!(d.form.date, "7");
        assert_eq!(d.form.priority, crate::model::Priority::Important);
        assert_eq!(
            handle_key(&mut s, &mut d, key(KeyCode::Enter)),
            KeyOutcome::Dispatch(Action::Add)
        );
    }

    #[test]
    fn filter_applies_on_enter() {
        let mut d = dispatcher();
        let mut s = AppState::new("", String::new());
        handle_key(&mut s, &mut d, key(KeyCode::Char('f')));
        for c in "2024-01-01".chars() {
            handle_key(&mut s, &mut d, key(KeyCode::Char(c)));
        }
        assert_eq!(
            handle_key(&mut s, &mut d, key(KeyCode::Enter)),
            KeyOutcome::Dispatch(Action::SetFilter("2024-01-01".into()))
        );
        assert_eq!(s.mode, InputMode::Normal);
    }

    #[test]
    fn row_actions_need_a_row() {
        let mut d = dispatcher();
        let mut s = AppState::new("", String::new());
        assert_eq!(
            handle_key(&mut s, &mut d, key(KeyCode::Char(' '))),
            KeyOutcome::Continue
        );
        assert_eq!(
            handle_key(&mut s, &mut d, key(KeyCode::Char('q'))),
            KeyOutcome::Quit
        );
    }
}
