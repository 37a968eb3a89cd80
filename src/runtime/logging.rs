use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogSettings;

/// Where logs go when `log.file` is not set. The terminal belongs to the UI.
pub fn log_path(settings: &LogSettings) -> PathBuf {
    settings
        .file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("spindle.log"))
}

/// Install the global `tracing` subscriber writing to the log file.
///
/// `SPINDLE_LOG` takes precedence over `log.level`.
pub fn init(settings: &LogSettings) -> Result<PathBuf, Box<dyn Error>> {
    let path = log_path(settings);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env("SPINDLE_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()?;

    Ok(path)
}
