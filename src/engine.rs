//! The playback engine contract consumed by the controller.
//!
//! An engine transports one audio stream at a time. Every call may complete
//! asynchronously: lifecycle changes are reported as `EngineEvent`s tagged with
//! the `LoadCycle` that was passed to `load`, and the controller drains them
//! through `poll_event`.

use std::fmt;

use thiserror::Error;

/// Token identifying one load cycle. Minted by the controller, echoed by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadCycle(u64);

impl LoadCycle {
    #[cfg(test)]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The token following this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[cfg(test)]
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How much media the engine has buffered for the current load.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    /// Enough data to render the current position. Playback may be requested.
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Whether `play()` can be issued without waiting for more data.
    pub fn can_play(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    /// Duration is known; read it with `PlaybackEngine::duration`.
    MetadataLoaded,
    /// Position advanced; read it with `PlaybackEngine::current_time`.
    TimeUpdate,
    /// The whole stream can be played without stalling. Once per load.
    CanPlayThrough,
    /// Playback reached the end of the stream.
    Ended,
    /// A previously accepted `play()` request failed.
    PlayRejected { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub cycle: LoadCycle,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn new(cycle: LoadCycle, kind: EngineEventKind) -> Self {
        Self { cycle, kind }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The engine refused to start (nothing loaded, output unavailable, ...).
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    #[error("failed to open {url}: {reason}")]
    Open { url: String, reason: String },

    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The engine's worker is gone.
    #[error("engine disconnected")]
    Disconnected,
}

/// Capability for decoding and transporting a single audio stream.
pub trait PlaybackEngine {
    /// Start loading `url`. Events for this load carry `cycle`.
    fn load(&mut self, url: &str, cycle: LoadCycle);

    /// Request playback. An immediate refusal is returned as `Err`; a refusal
    /// detected later arrives as `EngineEventKind::PlayRejected`.
    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self);

    /// Move the playback position, in seconds.
    fn seek(&mut self, seconds: f64);

    fn current_time(&self) -> f64;

    /// Stream duration in seconds, once metadata is available.
    fn duration(&self) -> Option<f64>;

    fn paused(&self) -> bool;

    fn ready_state(&self) -> ReadyState;

    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    /// Next pending lifecycle event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<EngineEvent>;

    /// Stop playback and free the output.
    fn release(&mut self) {}
}
