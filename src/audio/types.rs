//! Audio-related small types and handles.
//!
//! Commands sent to the audio thread and the status snapshot it shares with
//! the engine handle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::engine::{LoadCycle, ReadyState};

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Replace the current stream with the file at `path`.
    Load {
        path: PathBuf,
        url: String,
        cycle: LoadCycle,
    },
    Play,
    Pause,
    /// Absolute position in seconds, tagged with the generation from `EngineStatus::request_seek`.
    Seek { seconds: f64, seek_gen: u64 },
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Media-element style status, readable without a round trip to the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct EngineStatus {
    /// Load this snapshot describes. The audio thread only writes its own cycle.
    pub(super) cycle: LoadCycle,
    pub(super) current_time: f64,
    pub(super) duration: Option<f64>,
    pub(super) paused: bool,
    pub(super) ready_state: ReadyState,
    pub(super) volume: f32,
    /// Latest seek requested by the engine handle.
    pub(super) seek_gen: u64,
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self {
            cycle: LoadCycle::default(),
            current_time: 0.0,
            duration: None,
            paused: true,
            ready_state: ReadyState::HaveNothing,
            volume: 1.0,
            seek_gen: 0,
        }
    }
}

impl EngineStatus {
    /// Reset for a new load, the way a media element does when its source changes.
    pub(super) fn begin_load(&mut self, cycle: LoadCycle) {
        self.cycle = cycle;
        self.current_time = 0.0;
        self.duration = None;
        self.paused = true;
        self.ready_state = ReadyState::HaveNothing;
    }

    /// Mirror a seek before the audio thread gets to it. Returns its generation.
    pub(super) fn request_seek(&mut self, seconds: f64) -> u64 {
        self.seek_gen += 1;
        self.current_time = seconds;
        self.seek_gen
    }

    /// Position reported by the audio thread after applying seek `seek_gen`.
    /// Dropped while a newer seek is still queued.
    pub(super) fn apply_position(&mut self, seek_gen: u64, seconds: f64) -> bool {
        if seek_gen < self.seek_gen {
            return false;
        }
        self.current_time = seconds;
        true
    }
}

pub(super) type StatusHandle = Arc<Mutex<EngineStatus>>;
