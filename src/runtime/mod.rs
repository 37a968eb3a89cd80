use std::env;
use std::path::PathBuf;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioEngine;
use crate::controller::{ControllerOptions, PlaybackController};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (mut settings, fallback_reason) = settings::load_settings();

    // An optional first argument overrides the media root.
    if let Some(dir) = env::args().nth(1) {
        settings.audio.media_root = PathBuf::from(dir);
    }

    match logging::init(&settings.log) {
        Ok(path) => info!(log = %path.display(), "logging initialized"),
        Err(e) => eprintln!("spindle: logging disabled: {e}"),
    }
    if let Some(reason) = fallback_reason {
        warn!(%reason, "using default settings");
    }

    let playlist = startup::build_playlist(&settings)?;
    info!(
        tracks = playlist.len(),
        media_root = %settings.audio.media_root.display(),
        "starting"
    );

    let engine = RodioEngine::spawn(&settings.audio)?;
    let mut controller =
        PlaybackController::new(engine, playlist, ControllerOptions::from(&settings.playback));
    let mut app = App::new(controller.playlist().len(), settings.ui.follow_playback);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut controller);

    // Fades out and joins the audio thread before the terminal is restored.
    controller.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
