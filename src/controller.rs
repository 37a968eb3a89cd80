//! Playback controller: the state machine between user intents and the engine.
//!
//! The controller owns the `PlaybackState`, the `Playlist` and the engine.
//! User actions mutate the desired state and then run `reconcile`, which brings
//! the engine's transport in line with `is_playing`. Engine lifecycle events
//! are applied through `pump`/`handle_event`; events from a superseded load
//! cycle are dropped.

mod action;
mod state;
mod subscription;

pub use action::Action;
pub use state::{PlaybackState, TransportPhase};

use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::engine::{EngineError, EngineEvent, EngineEventKind, LoadCycle, PlaybackEngine};
use crate::playlist::{Playlist, Track};

use state::{clamp_volume, sanitize_duration};
use subscription::Subscription;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("track index {index} is out of range (playlist has {len} tracks)")]
    TrackOutOfRange { index: usize, len: usize },
}

/// Initial values applied when the controller is mounted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub volume: f32,
    pub repeat: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            volume: 0.5,
            repeat: false,
        }
    }
}

pub struct PlaybackController<E: PlaybackEngine> {
    engine: E,
    playlist: Playlist,
    state: PlaybackState,
    subscription: Option<Subscription>,
    last_cycle: LoadCycle,
    torn_down: bool,
}

impl<E: PlaybackEngine> PlaybackController<E> {
    /// Mount a controller: apply `options` to the engine and start loading the
    /// first track without auto-resuming.
    pub fn new(engine: E, playlist: Playlist, options: ControllerOptions) -> Self {
        let mut controller = Self {
            engine,
            playlist,
            state: PlaybackState::new(options.volume, options.repeat),
            subscription: None,
            last_cycle: LoadCycle::default(),
            torn_down: false,
        };
        controller.engine.set_volume(controller.state.volume);
        controller.begin_load(0, false);
        controller
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> &Track {
        &self.playlist[self.state.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn total_time(&self) -> f64 {
        self.state.total_time
    }

    pub fn volume(&self) -> f32 {
        self.state.volume
    }

    pub fn repeat(&self) -> bool {
        self.state.repeat
    }

    pub fn phase(&self) -> TransportPhase {
        self.state.phase
    }

    #[cfg(test)]
    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Route a UI action to its handler.
    pub fn dispatch(&mut self, action: Action) -> Result<(), ControllerError> {
        match action {
            Action::PlayPause => self.play_pause(),
            Action::Next => self.next(),
            Action::Previous => self.previous(),
            Action::Seek(seconds) => self.seek(seconds),
            Action::SetVolume(volume) => self.set_volume(volume),
            Action::Skip(delta) => self.skip(delta),
            Action::SelectTrack(index) => return self.select_track(index),
            Action::ToggleRepeat => self.toggle_repeat(),
        }
        Ok(())
    }

    pub fn play_pause(&mut self) {
        if self.torn_down {
            return;
        }
        self.state.is_playing = !self.state.is_playing;
        // A toggle while loading replaces whatever intent started the load.
        if matches!(self.state.phase, TransportPhase::Loading(_)) {
            self.state.resume_after_load = self.state.is_playing;
        }
        debug!(is_playing = self.state.is_playing, "play/pause toggled");
        self.reconcile();
    }

    pub fn next(&mut self) {
        let index = self.playlist.next_index(self.state.current_index);
        self.change_track(index, true);
    }

    pub fn previous(&mut self) {
        let index = self.playlist.previous_index(self.state.current_index);
        self.change_track(index, true);
    }

    /// Jump to the track at `index`. Selecting the current track does nothing.
    pub fn select_track(&mut self, index: usize) -> Result<(), ControllerError> {
        if !self.playlist.contains_index(index) {
            return Err(ControllerError::TrackOutOfRange {
                index,
                len: self.playlist.len(),
            });
        }
        if index != self.state.current_index {
            self.change_track(index, true);
        }
        Ok(())
    }

    /// Move to `seconds`, clamped to `[0, total_time]`, mirrored immediately.
    pub fn seek(&mut self, seconds: f64) {
        if self.torn_down {
            return;
        }
        let Some(target) = self.state.clamp_time(seconds) else {
            warn!("ignoring seek to NaN");
            return;
        };
        self.engine.seek(target);
        self.state.current_time = target;
        trace!(position = target, "seek");
    }

    pub fn skip(&mut self, delta: f64) {
        self.seek(self.state.current_time + delta);
    }

    pub fn set_volume(&mut self, volume: f32) {
        if self.torn_down {
            return;
        }
        let Some(volume) = clamp_volume(volume) else {
            warn!("ignoring NaN volume");
            return;
        };
        self.engine.set_volume(volume);
        self.state.volume = self.engine.volume();
    }

    pub fn toggle_repeat(&mut self) {
        self.state.repeat = !self.state.repeat;
        debug!(repeat = self.state.repeat, "repeat toggled");
    }

    /// Apply every pending engine event. Returns how many were drained.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.engine.poll_event() {
            self.handle_event(event);
            drained += 1;
        }
        drained
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        let Some(subscription) = self.subscription.as_mut() else {
            trace!(cycle = %event.cycle, "no active subscription, dropping event");
            return;
        };
        if !subscription.owns(&event) {
            trace!(
                cycle = %event.cycle,
                current = %subscription.cycle(),
                "dropping event from superseded load"
            );
            return;
        }
        let can_play_through = matches!(event.kind, EngineEventKind::CanPlayThrough)
            && subscription.take_can_play_through();

        match event.kind {
            EngineEventKind::MetadataLoaded => self.on_metadata_loaded(),
            EngineEventKind::TimeUpdate => self.on_time_update(),
            EngineEventKind::CanPlayThrough => {
                if can_play_through {
                    self.on_can_play_through();
                }
            }
            EngineEventKind::Ended => self.on_ended(),
            EngineEventKind::PlayRejected { reason } => {
                self.on_play_rejected(&EngineError::PlaybackRejected(reason))
            }
        }
    }

    /// Bring the engine's transport in line with `is_playing`. Does nothing
    /// when they already agree.
    pub fn reconcile(&mut self) {
        if self.torn_down {
            return;
        }
        let engine_paused = self.engine.paused();
        if self.state.is_playing && engine_paused && self.engine.ready_state().can_play() {
            match self.engine.play() {
                Ok(()) => self.state.phase = TransportPhase::Playing,
                Err(e) => self.on_play_rejected(&e),
            }
        } else if !self.state.is_playing && !engine_paused {
            self.engine.pause();
            self.state.phase = TransportPhase::Paused;
        }
    }

    /// Detach from the engine, stop it and release it. Runs once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(subscription) = self.subscription.take() {
            debug!(cycle = %subscription.cycle(), "detached load subscription");
        }
        self.engine.pause();
        self.engine.release();
        self.state.is_playing = false;
        self.state.phase = TransportPhase::Idle;
        info!("playback controller torn down");
    }

    fn change_track(&mut self, index: usize, explicit: bool) {
        let resume = self.state.is_playing || explicit;
        self.begin_load(index, resume);
    }

    fn begin_load(&mut self, index: usize, resume: bool) {
        if self.torn_down {
            return;
        }
        let cycle = self.last_cycle.next();
        self.last_cycle = cycle;
        if let Some(previous) = self.subscription.replace(Subscription::attach(cycle)) {
            trace!(cycle = %previous.cycle(), "detached load subscription");
        }

        self.state.current_index = index;
        self.state.resume_after_load = resume;
        self.state.current_time = 0.0;
        self.state.total_time = 0.0;
        self.state.phase = TransportPhase::Loading(index);

        let url = &self.playlist[index].url;
        info!(index, url = %url, cycle = %cycle, resume, "loading track");
        self.engine.load(url, cycle);
    }

    fn on_metadata_loaded(&mut self) {
        self.state.total_time = sanitize_duration(self.engine.duration());
        self.state.current_time = self.state.current_time.min(self.state.total_time);
        debug!(total = self.state.total_time, "metadata loaded");
    }

    fn on_time_update(&mut self) {
        let Some(position) = self.state.clamp_time(self.engine.current_time()) else {
            return;
        };
        if position > self.state.current_time {
            self.state.current_time = position;
        }
    }

    fn on_can_play_through(&mut self) {
        if matches!(self.state.phase, TransportPhase::Loading(_)) {
            self.state.phase = TransportPhase::Ready;
        }
        if std::mem::take(&mut self.state.resume_after_load) {
            self.state.is_playing = true;
        }
        debug!(resume = self.state.is_playing, "can play through");
        self.reconcile();
    }

    fn on_ended(&mut self) {
        if self.state.repeat {
            debug!(index = self.state.current_index, "track ended, repeating");
            self.state.current_time = 0.0;
            self.engine.seek(0.0);
            self.state.is_playing = true;
            match self.engine.play() {
                Ok(()) => self.state.phase = TransportPhase::Playing,
                Err(e) => self.on_play_rejected(&e),
            }
            return;
        }

        let index = self.playlist.next_index(self.state.current_index);
        debug!(next = index, "track ended, advancing");
        self.begin_load(index, true);
    }

    fn on_play_rejected(&mut self, err: &EngineError) {
        error!(error = %err, index = self.state.current_index, "error playing audio");
        self.state.is_playing = false;
        if !matches!(self.state.phase, TransportPhase::Loading(_)) {
            self.state.phase = TransportPhase::Paused;
        }
    }
}

impl<E: PlaybackEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests;
