//! Terminal demo surface.
//!
//! Renders the session snapshot (camera health, composed text, suggestion
//! row or keyboard grid, settings) and maps key presses onto controller
//! actions. The loop redraws whenever the session publishes a new snapshot
//! or a terminal event arrives.

mod view;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEvent, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use log::warn;
use ratatui::DefaultTerminal;

use crate::session::{SessionController, SENSITIVITY_STEP};

pub async fn run(controller: SessionController) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &controller).await;
    ratatui::restore();
    result
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

async fn event_loop(terminal: &mut DefaultTerminal, controller: &SessionController) -> Result<()> {
    let mut updates = controller.subscribe();
    let mut events = EventStream::new();
    let mut snapshot = controller.snapshot().await;

    loop {
        terminal.draw(|frame| view::render(frame, &snapshot))?;

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                snapshot = updates.borrow_and_update().clone();
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key(key, controller).await == Flow::Quit {
                            break;
                        }
                    }
                    Some(Ok(_)) => {} // resize etc.; redrawn on the next pass
                    Some(Err(err)) => warn!("terminal event error: {err}"),
                    None => break,
                }
            }
        }
    }

    Ok(())
}

async fn handle_key(key: KeyEvent, controller: &SessionController) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('t') | KeyCode::Char(' ') => {
            if let Err(err) = controller.toggle_tracking().await {
                warn!("cannot toggle tracking: {err:#}");
            }
        }
        KeyCode::Char('c') => controller.clear_text().await,
        KeyCode::Char('s') => controller.speak().await,
        KeyCode::Char('r') => controller.reset_cursor().await,
        KeyCode::Char('[') => controller.adjust_sensitivity(-SENSITIVITY_STEP).await,
        KeyCode::Char(']') => controller.adjust_sensitivity(SENSITIVITY_STEP).await,
        _ => {}
    }

    Flow::Continue
}
