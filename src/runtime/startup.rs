use crate::config;
use crate::playlist::{Playlist, PlaylistError};

/// The configured playlist, or the built-in one when the config has none.
pub fn build_playlist(settings: &config::Settings) -> Result<Playlist, PlaylistError> {
    if settings.playlist.is_empty() {
        Playlist::builtin()
    } else {
        Playlist::new(settings.playlist.clone())
    }
}
