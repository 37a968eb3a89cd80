//! Controller-owned playback state.

/// Coarse transport phase, derived from the controller's transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportPhase {
    #[default]
    Idle,
    /// Waiting for the engine to be able to play the track at this index.
    Loading(usize),
    Ready,
    Playing,
    Paused,
}

/// Everything the UI observes about playback.
///
/// Only the controller mutates it; everyone else gets a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    /// Desired transport state. May briefly disagree with the engine while loading.
    pub is_playing: bool,
    /// Seconds, `0 <= current_time <= total_time`.
    pub current_time: f64,
    pub total_time: f64,
    /// In `[0, 1]`.
    pub volume: f32,
    pub repeat: bool,
    /// Set by the transition that starts a load, consumed by `CanPlayThrough`.
    pub resume_after_load: bool,
    pub phase: TransportPhase,
}

impl PlaybackState {
    pub(super) fn new(volume: f32, repeat: bool) -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            current_time: 0.0,
            total_time: 0.0,
            volume: clamp_volume(volume).unwrap_or(1.0),
            repeat,
            resume_after_load: false,
            phase: TransportPhase::Idle,
        }
    }

    /// Clamp `seconds` into `[0, total_time]`. `None` for NaN.
    pub(super) fn clamp_time(&self, seconds: f64) -> Option<f64> {
        if seconds.is_nan() {
            return None;
        }
        Some(seconds.clamp(0.0, self.total_time.max(0.0)))
    }
}

/// Clamp a volume into `[0, 1]`. `None` for NaN.
pub(super) fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

/// Engine durations can be NaN or infinite before the stream is understood.
pub(super) fn sanitize_duration(duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => 0.0,
    }
}
