use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::engine::{EngineError, EngineEvent, LoadCycle, PlaybackEngine, ReadyState};

use super::sink::resolve_media_path;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, EngineStatus, StatusHandle};

/// `PlaybackEngine` that plays local files through the default output device.
pub struct RodioEngine {
    tx: Sender<AudioCmd>,
    events: Receiver<EngineEvent>,
    status: StatusHandle,
    media_root: PathBuf,
    quit_fade_out: Duration,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Start the audio thread. Fails when no output device can be opened.
    pub fn spawn(settings: &AudioSettings) -> Result<Self, EngineError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let (started_tx, started_rx) = mpsc::channel::<Result<(), EngineError>>();
        let status: StatusHandle = Arc::new(Mutex::new(EngineStatus::default()));

        let join = spawn_audio_thread(
            rx,
            event_tx,
            status.clone(),
            Duration::from_millis(settings.tick_ms.max(1)),
            started_tx,
        );

        match started_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = join.join();
                return Err(e);
            }
            Err(_) => {
                let _ = join.join();
                return Err(EngineError::Disconnected);
            }
        }

        Ok(Self {
            tx,
            events: event_rx,
            status,
            media_root: settings.media_root.clone(),
            quit_fade_out: Duration::from_millis(settings.quit_fade_out_ms),
            join: Some(join),
        })
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), EngineError> {
        self.tx.send(cmd).map_err(|_| EngineError::Disconnected)
    }

    fn send_or_warn(&self, cmd: AudioCmd) {
        if let Err(e) = self.send(cmd) {
            warn!(error = %e, "audio thread unavailable");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&EngineStatus) -> T) -> T {
        match self.status.lock() {
            Ok(st) => f(&st),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut EngineStatus) -> T) -> T {
        match self.status.lock() {
            Ok(mut st) => f(&mut st),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, url: &str, cycle: LoadCycle) {
        let path = resolve_media_path(&self.media_root, url);
        self.write(|st| st.begin_load(cycle));
        self.send_or_warn(AudioCmd::Load {
            path,
            url: url.to_string(),
            cycle,
        });
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.send(AudioCmd::Play)?;
        self.write(|st| st.paused = false);
        Ok(())
    }

    fn pause(&mut self) {
        self.write(|st| st.paused = true);
        self.send_or_warn(AudioCmd::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        let seek_gen = self.write(|st| st.request_seek(seconds));
        self.send_or_warn(AudioCmd::Seek { seconds, seek_gen });
    }

    fn current_time(&self) -> f64 {
        self.read(|st| st.current_time)
    }

    fn duration(&self) -> Option<f64> {
        self.read(|st| st.duration)
    }

    fn paused(&self) -> bool {
        self.read(|st| st.paused)
    }

    fn ready_state(&self) -> ReadyState {
        self.read(|st| st.ready_state)
    }

    fn volume(&self) -> f32 {
        self.read(|st| st.volume)
    }

    fn set_volume(&mut self, volume: f32) {
        self.write(|st| st.volume = volume);
        self.send_or_warn(AudioCmd::SetVolume(volume));
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.try_recv().ok()
    }

    /// Fade out, stop the audio thread and wait for it.
    fn release(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: self.quit_fade_out.as_millis() as u64,
        });
        let _ = join.join();
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.release();
    }
}
