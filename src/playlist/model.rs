use serde::Deserialize;
use thiserror::Error;

use super::builtin::BUILTIN_PLAYLIST;

/// One playable entry. Identified by its position in the `Playlist`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Track {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
            album: None,
            year: None,
            url: url.into(),
            image: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist must contain at least one track")]
    Empty,
    #[error("track {index} has no url")]
    MissingUrl { index: usize },
    #[error("built-in playlist is malformed: {0}")]
    Builtin(#[from] toml::de::Error),
}

#[derive(Deserialize)]
struct PlaylistFile {
    track: Vec<Track>,
}

/// Ordered, non-empty sequence of tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build a playlist, rejecting empty lists and tracks without a url.
    pub fn new(tracks: Vec<Track>) -> Result<Self, PlaylistError> {
        if tracks.is_empty() {
            return Err(PlaylistError::Empty);
        }
        if let Some(index) = tracks.iter().position(|t| t.url.trim().is_empty()) {
            return Err(PlaylistError::MissingUrl { index });
        }
        Ok(Self { tracks })
    }

    /// The compiled-in default playlist.
    pub fn builtin() -> Result<Self, PlaylistError> {
        let file: PlaylistFile = toml::from_str(BUILTIN_PLAYLIST)?;
        Self::new(file.track)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.tracks.len()
    }

    /// Index after `index`, wrapping to the first track.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, wrapping to the last track.
    pub fn previous_index(&self, index: usize) -> usize {
        if index == 0 {
            self.tracks.len() - 1
        } else {
            (index - 1).min(self.tracks.len() - 1)
        }
    }
}

impl std::ops::Index<usize> for Playlist {
    type Output = Track;

    fn index(&self, index: usize) -> &Track {
        &self.tracks[index]
    }
}
