use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::engine::{EngineError, EngineEvent, EngineEventKind, LoadCycle, ReadyState};

use super::probe::probe_duration;
use super::sink::create_sink_at;
use super::types::{AudioCmd, EngineStatus, StatusHandle};

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<EngineEvent>,
    status: StatusHandle,
    tick: Duration,
    started: Sender<Result<(), EngineError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = started.send(Err(EngineError::NoOutputDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = started.send(Ok(()));

        let mut transport = Transport::new(stream, events, status);
        let mut last_tick = Instant::now();

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    transport.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => transport.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    transport.quit(0);
                    break;
                }
            }

            // Commands can arrive faster than the tick; don't let them starve time updates.
            if last_tick.elapsed() >= tick {
                transport.tick();
                last_tick = Instant::now();
            }
        }
        debug!("audio thread exiting");
    })
}

struct Loaded {
    path: PathBuf,
    duration: Option<Duration>,
}

/// State owned by the audio thread.
struct Transport {
    stream: OutputStream,
    events: Sender<EngineEvent>,
    status: StatusHandle,
    cycle: LoadCycle,
    // Last seek generation this thread has applied.
    seek_gen: u64,
    loaded: Option<Loaded>,
    sink: Option<Sink>,
    paused: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
    volume: f32,
}

impl Transport {
    fn new(stream: OutputStream, events: Sender<EngineEvent>, status: StatusHandle) -> Self {
        let volume = status.lock().map(|s| s.volume).unwrap_or(1.0);
        Self {
            stream,
            events,
            status,
            cycle: LoadCycle::default(),
            seek_gen: 0,
            loaded: None,
            sink: None,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
            volume,
        }
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { path, url, cycle } => self.load(path, &url, cycle),
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Seek { seconds, seek_gen } => self.seek(seconds, seek_gen),
            AudioCmd::SetVolume(volume) => {
                self.volume = volume;
                if let Some(s) = self.sink.as_ref() {
                    s.set_volume(volume);
                }
                if let Ok(mut st) = self.status.lock() {
                    st.volume = volume;
                }
            }
            AudioCmd::Quit { fade_out_ms } => self.quit(fade_out_ms),
        }
    }

    fn emit(&self, kind: EngineEventKind) {
        let _ = self.events.send(EngineEvent::new(self.cycle, kind));
    }

    /// Update the shared status unless a newer load already took it over.
    fn write_status(&self, f: impl FnOnce(&mut EngineStatus)) {
        if let Ok(mut st) = self.status.lock() {
            if st.cycle == self.cycle {
                f(&mut st);
            }
        }
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn stop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn load(&mut self, path: PathBuf, url: &str, cycle: LoadCycle) {
        self.stop_sink();
        self.loaded = None;
        self.cycle = cycle;

        let mut duration = probe_duration(&path);
        if let Some(d) = duration {
            self.write_status(|st| {
                st.duration = Some(d.as_secs_f64());
                st.ready_state = ReadyState::HaveMetadata;
            });
            self.emit(EngineEventKind::MetadataLoaded);
        }

        let (sink, decoded_total) = match create_sink_at(&self.stream, &path, Duration::ZERO) {
            Ok(v) => v,
            Err(e) => {
                // Nothing more will arrive for this cycle; the load stalls.
                error!(error = %e, url, cycle = %cycle, "failed to load track");
                return;
            }
        };
        sink.set_volume(self.volume);

        if duration.is_none() {
            duration = decoded_total;
            if let Some(d) = duration {
                self.write_status(|st| st.duration = Some(d.as_secs_f64()));
            }
            self.emit(EngineEventKind::MetadataLoaded);
        }

        self.sink = Some(sink);
        self.loaded = Some(Loaded { path, duration });
        self.write_status(|st| st.ready_state = ReadyState::HaveEnoughData);
        debug!(url, cycle = %cycle, ?duration, "track ready");
        self.emit(EngineEventKind::CanPlayThrough);
    }

    fn play(&mut self) {
        let Some(s) = self.sink.as_ref() else {
            self.write_status(|st| st.paused = true);
            self.emit(EngineEventKind::PlayRejected {
                reason: "no media loaded".to_string(),
            });
            return;
        };
        if self.paused {
            s.play();
            self.paused = false;
            self.started_at = Some(Instant::now());
        }
        self.write_status(|st| st.paused = false);
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        if !self.paused {
            if let Some(st) = self.started_at.take() {
                self.accumulated += st.elapsed();
            }
            self.paused = true;
        }
        let position = self.elapsed().as_secs_f64();
        let seek_gen = self.seek_gen;
        self.write_status(|st| {
            st.paused = true;
            st.apply_position(seek_gen, position);
        });
    }

    /// Rebuild the current sink and skip into the file.
    fn seek(&mut self, seconds: f64, seek_gen: u64) {
        self.seek_gen = seek_gen;
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let mut target = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or_default();
        if let Some(d) = loaded.duration {
            target = target.min(d);
        }

        let path = loaded.path.clone();
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        match create_sink_at(&self.stream, &path, target) {
            Ok((sink, _)) => {
                sink.set_volume(self.volume);
                if self.paused {
                    self.started_at = None;
                } else {
                    sink.play();
                    self.started_at = Some(Instant::now());
                }
                self.sink = Some(sink);
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "seek failed to reopen track");
                self.paused = true;
                self.started_at = None;
            }
        }

        self.accumulated = target;
        self.write_status(|st| {
            st.apply_position(seek_gen, target.as_secs_f64());
        });
    }

    fn tick(&mut self) {
        if self.paused {
            return;
        }
        let Some(s) = self.sink.as_ref() else {
            return;
        };
        let duration = self.loaded.as_ref().and_then(|l| l.duration);
        let drained = s.empty();

        let mut elapsed = self.elapsed();
        if let Some(d) = duration {
            elapsed = elapsed.min(d);
        }
        let position = if drained {
            duration.unwrap_or(elapsed).as_secs_f64()
        } else {
            elapsed.as_secs_f64()
        };

        let seek_gen = self.seek_gen;
        self.write_status(|st| {
            st.apply_position(seek_gen, position);
        });
        self.emit(EngineEventKind::TimeUpdate);

        if drained {
            self.paused = true;
            self.started_at = None;
            self.accumulated = Duration::try_from_secs_f64(position).unwrap_or_default();
            self.write_status(|st| st.paused = true);
            self.emit(EngineEventKind::Ended);
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.as_ref() {
            if !self.paused {
                // Fade out gently before stopping.
                fade_out_sink(s, self.volume, fade_out_ms);
            }
            s.stop();
        }
        self.sink = None;
        self.paused = true;
        // Update shared state so the UI doesn't keep showing Playing.
        self.write_status(|st| st.paused = true);
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
