// File: src/tui/mod.rs
pub mod action;
pub mod state;
pub mod view;

use crate::app::AppContext;
use crate::dispatch::Action;
use action::{KeyOutcome, after_dispatch, handle_key};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use state::AppState;

/// Runs the terminal UI until the user quits, then tears the context down.
pub async fn run(mut ctx: AppContext) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut ctx).await;
    ratatui::restore();
    ctx.teardown();
    result
}

async fn event_loop(terminal: &mut DefaultTerminal, ctx: &mut AppContext) -> anyhow::Result<()> {
    let initial = ctx.initial_action();
    let filter = match &initial {
        Action::SetFilter(f) => f.clone(),
        _ => String::new(),
    };
    let mut state = AppState::new(&filter, ctx.clock.current());
    let mut ticks = ctx.clock.subscribe();
    let mut clock_alive = true;
    let mut events = EventStream::new();

    run_action(terminal, &mut state, ctx, initial).await?;

    loop {
        state.clock = ticks.borrow_and_update().clone();
        terminal.draw(|f| view::draw(f, &mut state, &ctx.dispatcher))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    match handle_key(&mut state, &mut ctx.dispatcher, key) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Continue => {}
                        KeyOutcome::Dispatch(action) => {
                            run_action(terminal, &mut state, ctx, action).await?;
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            res = ticks.changed(), if clock_alive => {
                if res.is_err() {
                    clock_alive = false;
                }
            }
        }
    }
    Ok(())
}

/// Shows the busy marker, runs the action to completion, then re-syncs the
/// input mode. No other key is read until the store round trip finishes.
async fn run_action(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    ctx: &mut AppContext,
    action: Action,
) -> anyhow::Result<()> {
    state.busy = true;
    terminal.draw(|f| view::draw(f, state, &ctx.dispatcher))?;
    ctx.dispatcher.dispatch(action).await;
    state.busy = false;
    after_dispatch(state, &ctx.dispatcher);
    Ok(())
}
