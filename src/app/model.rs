//! Front-end model: the track-list cursor and popup flags.

/// The main application model.
pub struct App {
    /// Highlighted row in the track list.
    pub cursor: usize,
    track_count: usize,
    /// Whether the cursor follows the current track.
    pub follow_playback: bool,
    pub details_window: bool,
}

impl App {
    /// Create a new `App` for a playlist of `track_count` tracks.
    pub fn new(track_count: usize, follow_playback: bool) -> Self {
        Self {
            cursor: 0,
            track_count,
            follow_playback,
            details_window: false,
        }
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window;
    }

    /// Move the cursor down, wrapping to the top. Stops following playback.
    pub fn cursor_down(&mut self) {
        if self.track_count == 0 {
            return;
        }
        self.follow_playback = false;
        self.cursor = (self.cursor + 1) % self.track_count;
    }

    /// Move the cursor up, wrapping to the bottom. Stops following playback.
    pub fn cursor_up(&mut self) {
        if self.track_count == 0 {
            return;
        }
        self.follow_playback = false;
        self.cursor = if self.cursor == 0 {
            self.track_count - 1
        } else {
            self.cursor - 1
        };
    }

    /// Move the cursor to the current track when following playback.
    pub fn sync_cursor(&mut self, current_index: usize) {
        if self.follow_playback && current_index < self.track_count {
            self.cursor = current_index;
        }
    }

    /// The track to select on Enter. Re-enables following.
    pub fn take_selection(&mut self) -> usize {
        self.follow_playback = true;
        self.cursor
    }
}
