use crate::config;

/// Settings to run with, plus the reason defaults were used instead of the
/// config file, if they were. Logging is not up yet when this runs.
pub fn load_settings() -> (config::Settings, Option<String>) {
    let settings = match config::Settings::load() {
        Ok(s) => s,
        // Config is optional; failures fall back to defaults.
        Err(e) => return fallback(format!("failed to load config: {e}")),
    };
    match settings.validate() {
        Ok(()) => (settings, None),
        Err(msg) => fallback(format!("invalid config: {msg}")),
    }
}

fn fallback(reason: String) -> (config::Settings, Option<String>) {
    (config::Settings::default(), Some(reason))
}
