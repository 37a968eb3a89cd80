use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::app::App;
use crate::config;
use crate::controller::{Action, PlaybackController, PlaybackState};
use crate::engine::PlaybackEngine;
use crate::ui;

/// Main terminal event loop: applies engine events, draws, and handles input.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<E: PlaybackEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<E>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        controller.pump();
        app.sync_cursor(controller.current_index());

        terminal.draw(|f| ui::draw(f, app, controller, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<E>,
) -> bool {
    let action = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            app.cursor_down();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.cursor_up();
            None
        }
        KeyCode::Char('K') => {
            app.toggle_details_window();
            None
        }
        KeyCode::Enter => Some(Action::SelectTrack(app.take_selection())),
        code => action_for_key(code, &settings.controls, controller.state()),
    };

    if let Some(action) = action {
        if let Err(e) = controller.dispatch(action) {
            warn!(error = %e, ?action, "action rejected");
        }
    }
    false
}

/// Map a key to a controller action, given the current playback state.
fn action_for_key(
    code: KeyCode,
    controls: &config::ControlsSettings,
    state: &PlaybackState,
) -> Option<Action> {
    match code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Some(Action::PlayPause),
        KeyCode::Char('l') => Some(Action::Next),
        KeyCode::Char('h') => Some(Action::Previous),
        KeyCode::Char('L') | KeyCode::Right => Some(Action::Skip(controls.skip_seconds)),
        KeyCode::Char('H') | KeyCode::Left => Some(Action::Skip(-controls.skip_seconds)),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            Some(Action::SetVolume(state.volume + controls.volume_step))
        }
        KeyCode::Char('-') => Some(Action::SetVolume(state.volume - controls.volume_step)),
        KeyCode::Char('r') => Some(Action::ToggleRepeat),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let tenth = f64::from(c.to_digit(10)?);
            Some(Action::Seek(state.total_time * tenth / 10.0))
        }
        _ => None,
    }
}
