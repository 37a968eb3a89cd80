use std::collections::VecDeque;

use super::*;
use crate::engine::ReadyState;
use crate::playlist::Track;

/// Behaves like a media element that never loads anything on its own:
/// tests decide when metadata arrives and when the stream becomes playable.
#[derive(Default)]
struct FakeEngine {
    loads: Vec<(String, LoadCycle)>,
    play_calls: usize,
    pause_calls: usize,
    seeks: Vec<f64>,
    released: usize,
    paused: bool,
    ready: ReadyState,
    position: f64,
    duration: Option<f64>,
    volume: f32,
    events: VecDeque<EngineEvent>,
    reject_play: Option<EngineError>,
}

impl FakeEngine {
    fn new() -> Self {
        Self {
            paused: true,
            volume: 1.0,
            ..Self::default()
        }
    }

    fn cycle(&self) -> LoadCycle {
        self.loads.last().map(|(_, c)| *c).unwrap_or_default()
    }

    fn emit(&mut self, kind: EngineEventKind) {
        let cycle = self.cycle();
        self.events.push_back(EngineEvent::new(cycle, kind));
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, url: &str, cycle: LoadCycle) {
        self.loads.push((url.to_string(), cycle));
        self.paused = true;
        self.ready = ReadyState::HaveNothing;
        self.position = 0.0;
        self.duration = None;
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.play_calls += 1;
        if let Some(err) = self.reject_play.take() {
            return Err(err);
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        self.position = seconds;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }

    fn release(&mut self) {
        self.released += 1;
    }
}

fn playlist(n: usize) -> Playlist {
    let tracks = (0..n)
        .map(|i| Track::new(format!("Track {i}"), format!("{i}.mp3")))
        .collect();
    Playlist::new(tracks).unwrap()
}

fn two_tracks() -> Playlist {
    Playlist::new(vec![Track::new("A", "a.mp3"), Track::new("B", "b.mp3")]).unwrap()
}

fn controller(playlist: Playlist) -> PlaybackController<FakeEngine> {
    PlaybackController::new(FakeEngine::new(), playlist, ControllerOptions::default())
}

/// Finish the current load: metadata with `duration`, then can-play-through.
fn finish_load(c: &mut PlaybackController<FakeEngine>, duration: f64) {
    let engine = c.engine_mut();
    engine.duration = Some(duration);
    engine.ready = ReadyState::HaveMetadata;
    engine.emit(EngineEventKind::MetadataLoaded);
    c.pump();
    let engine = c.engine_mut();
    engine.ready = ReadyState::HaveEnoughData;
    engine.emit(EngineEventKind::CanPlayThrough);
    c.pump();
}

fn tick(c: &mut PlaybackController<FakeEngine>, position: f64) {
    let engine = c.engine_mut();
    engine.position = position;
    engine.emit(EngineEventKind::TimeUpdate);
    c.pump();
}

fn end_track(c: &mut PlaybackController<FakeEngine>) {
    let engine = c.engine_mut();
    engine.paused = true;
    engine.emit(EngineEventKind::Ended);
    c.pump();
}

#[test]
fn mount_loads_first_track_without_autoplay() {
    let mut c = controller(two_tracks());
    assert_eq!(c.engine().loads, vec![("a.mp3".to_string(), LoadCycle::new(1))]);
    assert_eq!(c.phase(), TransportPhase::Loading(0));
    assert_eq!(c.engine().volume, 0.5);

    finish_load(&mut c, 120.0);
    assert!(!c.is_playing());
    assert_eq!(c.engine().play_calls, 0);
    assert_eq!(c.total_time(), 120.0);
    assert_eq!(c.phase(), TransportPhase::Ready);
}

#[test]
fn seeks_after_select_stay_within_track_bounds() {
    for i in 0..3 {
        let mut c = controller(playlist(3));
        c.select_track(i).unwrap();
        finish_load(&mut c, 200.0);

        for t in [-50.0, 0.0, 12.5, 199.0, 200.0, 250.0, f64::INFINITY, f64::NEG_INFINITY] {
            c.seek(t);
            assert!(c.current_time() >= 0.0, "seek {t} went below zero");
            assert!(c.current_time() <= c.total_time(), "seek {t} passed the end");
        }
    }
}

#[test]
fn seek_before_metadata_is_pinned_to_zero() {
    let mut c = controller(two_tracks());
    c.seek(42.0);
    assert_eq!(c.current_time(), 0.0);
    assert_eq!(c.engine().seeks, vec![0.0]);
}

#[test]
fn seek_mirrors_position_immediately() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.seek(30.0);
    assert_eq!(c.current_time(), 30.0);
    assert_eq!(c.engine().position, 30.0);
}

#[test]
fn seek_to_nan_is_ignored() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.seek(10.0);
    c.seek(f64::NAN);
    assert_eq!(c.current_time(), 10.0);
    assert_eq!(c.engine().seeks, vec![10.0]);
}

#[test]
fn double_toggle_restores_state_and_engine_transport() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);

    let before = c.is_playing();
    c.play_pause();
    assert!(c.is_playing());
    assert!(!c.engine().paused);
    c.play_pause();
    assert_eq!(c.is_playing(), before);
    assert!(c.engine().paused);
    assert_eq!(c.engine().play_calls, 1);
    assert_eq!(c.engine().pause_calls, 1);
}

#[test]
fn reconcile_is_idempotent_when_consistent() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.play_pause();

    c.reconcile();
    c.reconcile();
    assert_eq!(c.engine().play_calls, 1);
    assert_eq!(c.engine().pause_calls, 0);
    assert_eq!(c.phase(), TransportPhase::Playing);
}

#[test]
fn repeat_replays_same_track_on_end() {
    let mut c = controller(playlist(3));
    c.toggle_repeat();
    c.select_track(1).unwrap();
    finish_load(&mut c, 100.0);
    tick(&mut c, 99.0);

    for _ in 0..3 {
        end_track(&mut c);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.current_time(), 0.0);
        assert!(c.is_playing());
    }
    assert_eq!(c.engine().loads.len(), 2);
    assert_eq!(c.engine().seeks, vec![0.0, 0.0, 0.0]);
}

#[test]
fn end_without_repeat_advances_by_one_and_wraps() {
    let n = 4;
    let mut c = controller(playlist(n));
    finish_load(&mut c, 10.0);

    for step in 1..=n + 1 {
        let before = c.current_index();
        end_track(&mut c);
        assert_eq!(c.current_index(), (before + 1) % n, "step {step}");
        finish_load(&mut c, 10.0);
        assert!(c.is_playing());
    }
}

#[test]
fn two_track_scenario_advances_then_wraps() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 180.0);
    c.play_pause();
    tick(&mut c, 90.0);

    end_track(&mut c);
    assert_eq!(c.current_index(), 1);
    assert_eq!(c.current_time(), 0.0);
    assert_eq!(c.engine().loads.last().unwrap().0, "b.mp3");

    finish_load(&mut c, 200.0);
    end_track(&mut c);
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.engine().loads.last().unwrap().0, "a.mp3");
}

#[test]
fn volume_is_clamped_into_unit_range() {
    let mut c = controller(two_tracks());
    c.set_volume(1.5);
    assert_eq!(c.volume(), 1.0);
    assert_eq!(c.engine().volume, 1.0);

    c.set_volume(-0.2);
    assert_eq!(c.volume(), 0.0);

    c.set_volume(f32::NAN);
    assert_eq!(c.volume(), 0.0);
}

#[test]
fn initial_volume_outside_range_is_clamped() {
    let options = ControllerOptions {
        volume: 3.0,
        repeat: false,
    };
    let c = PlaybackController::new(FakeEngine::new(), two_tracks(), options);
    assert_eq!(c.volume(), 1.0);
}

#[test]
fn skip_forward_stops_at_end() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.seek(95.0);
    c.skip(10.0);
    assert_eq!(c.current_time(), 100.0);
}

#[test]
fn skip_backward_stops_at_zero() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.seek(4.0);
    c.skip(-10.0);
    assert_eq!(c.current_time(), 0.0);
}

#[test]
fn rejected_play_on_toggle_forces_paused() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.engine_mut().reject_play = Some(EngineError::PlaybackRejected("autoplay".into()));

    c.play_pause();
    assert!(!c.is_playing());
    assert_eq!(c.phase(), TransportPhase::Paused);
}

#[test]
fn late_play_rejection_forces_paused() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.play_pause();
    assert!(c.is_playing());

    c.engine_mut().paused = true;
    c.engine_mut().emit(EngineEventKind::PlayRejected {
        reason: "decode error".into(),
    });
    c.pump();
    assert!(!c.is_playing());
}

#[test]
fn navigation_resumes_playback_after_load() {
    let mut c = controller(playlist(3));
    finish_load(&mut c, 100.0);
    assert!(!c.is_playing());

    c.next();
    assert_eq!(c.phase(), TransportPhase::Loading(1));
    assert!(c.state().resume_after_load);
    finish_load(&mut c, 100.0);
    assert!(c.is_playing());
    assert!(!c.state().resume_after_load);
    assert_eq!(c.engine().play_calls, 1);

    c.previous();
    assert_eq!(c.current_index(), 0);
    c.previous();
    assert_eq!(c.current_index(), 2);
}

#[test]
fn can_play_through_acts_once_per_cycle() {
    let mut c = controller(two_tracks());
    c.next();
    finish_load(&mut c, 100.0);
    assert_eq!(c.engine().play_calls, 1);

    c.play_pause();
    assert!(!c.is_playing());

    // A duplicate notification for the same load must not resume.
    c.engine_mut().emit(EngineEventKind::CanPlayThrough);
    c.pump();
    assert!(!c.is_playing());
    assert_eq!(c.engine().play_calls, 1);
}

#[test]
fn events_from_superseded_load_are_ignored() {
    let mut c = controller(playlist(3));
    finish_load(&mut c, 100.0);
    let stale = c.engine().cycle();

    c.select_track(2).unwrap();
    c.engine_mut().duration = Some(999.0);
    c.engine_mut().ready = ReadyState::HaveEnoughData;
    c.handle_event(EngineEvent::new(stale, EngineEventKind::MetadataLoaded));
    c.handle_event(EngineEvent::new(stale, EngineEventKind::CanPlayThrough));
    c.handle_event(EngineEvent::new(stale, EngineEventKind::Ended));

    assert_eq!(c.current_index(), 2);
    assert_eq!(c.total_time(), 0.0);
    assert!(!c.is_playing());
    assert_eq!(c.phase(), TransportPhase::Loading(2));
    assert_eq!(c.engine().play_calls, 0);
}

#[test]
fn play_requested_during_load_starts_once_ready() {
    let mut c = controller(two_tracks());
    c.play_pause();
    assert!(c.is_playing());
    assert_eq!(c.engine().play_calls, 0);

    finish_load(&mut c, 60.0);
    assert_eq!(c.engine().play_calls, 1);
    assert!(!c.engine().paused);
}

#[test]
fn pause_during_load_cancels_resume() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 60.0);
    c.play_pause();
    c.next();
    assert!(c.state().resume_after_load);

    c.play_pause();
    assert!(!c.state().resume_after_load);

    finish_load(&mut c, 60.0);
    assert!(!c.is_playing());
    assert_eq!(c.engine().play_calls, 1);
}

#[test]
fn time_updates_are_clamped_and_monotonic() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.play_pause();

    tick(&mut c, 5.0);
    assert_eq!(c.current_time(), 5.0);
    tick(&mut c, 4.5);
    assert_eq!(c.current_time(), 5.0);
    tick(&mut c, 150.0);
    assert_eq!(c.current_time(), 100.0);

    c.seek(20.0);
    tick(&mut c, 20.25);
    assert_eq!(c.current_time(), 20.25);
}

#[test]
fn track_change_resets_position() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.seek(50.0);
    c.next();
    assert_eq!(c.current_time(), 0.0);
    assert_eq!(c.total_time(), 0.0);
}

#[test]
fn select_track_out_of_range_is_an_error() {
    let mut c = controller(two_tracks());
    assert_eq!(
        c.select_track(2),
        Err(ControllerError::TrackOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(c.engine().loads.len(), 1);
}

#[test]
fn selecting_current_track_does_not_reload() {
    let mut c = controller(two_tracks());
    c.select_track(0).unwrap();
    assert_eq!(c.engine().loads.len(), 1);
}

#[test]
fn dispatch_routes_actions() {
    let mut c = controller(playlist(3));
    finish_load(&mut c, 100.0);

    c.dispatch(Action::SetVolume(0.25)).unwrap();
    c.dispatch(Action::Seek(40.0)).unwrap();
    c.dispatch(Action::Skip(-10.0)).unwrap();
    c.dispatch(Action::ToggleRepeat).unwrap();
    assert_eq!(c.volume(), 0.25);
    assert_eq!(c.current_time(), 30.0);
    assert!(c.repeat());

    c.dispatch(Action::SelectTrack(2)).unwrap();
    assert_eq!(c.current_track().url, "2.mp3");
    assert!(c.dispatch(Action::SelectTrack(7)).is_err());
}

#[test]
fn teardown_pauses_releases_and_detaches_once() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.play_pause();

    c.teardown();
    c.teardown();
    assert_eq!(c.engine().released, 1);
    assert!(c.engine().paused);
    assert!(!c.is_playing());

    c.engine_mut().emit(EngineEventKind::Ended);
    c.pump();
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.engine().loads.len(), 1);
}

#[test]
fn backward_seeks_let_time_follow_the_engine_again() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.play_pause();
    tick(&mut c, 90.0);

    c.skip(-10.0);
    c.skip(-10.0);
    assert_eq!(c.current_time(), 70.0);
    assert_eq!(c.engine().seeks, vec![80.0, 70.0]);

    // The engine keeps reporting the newest seek target until it has applied it.
    tick(&mut c, 70.0);
    tick(&mut c, 70.25);
    tick(&mut c, 70.5);
    assert_eq!(c.current_time(), 70.5);
}

#[test]
fn unusable_durations_are_treated_as_zero() {
    for duration in [None, Some(f64::NAN), Some(f64::INFINITY), Some(-5.0)] {
        let mut c = controller(two_tracks());
        c.engine_mut().duration = duration;
        c.engine_mut().emit(EngineEventKind::MetadataLoaded);
        c.pump();
        assert_eq!(c.total_time(), 0.0, "duration {duration:?}");

        c.seek(30.0);
        assert_eq!(c.current_time(), 0.0, "duration {duration:?}");
    }
}

#[test]
fn stale_time_updates_and_rejections_are_ignored() {
    let mut c = controller(playlist(3));
    finish_load(&mut c, 100.0);
    c.play_pause();
    tick(&mut c, 40.0);
    let stale = c.engine().cycle();

    c.select_track(2).unwrap();
    c.engine_mut().position = 55.0;
    c.handle_event(EngineEvent::new(stale, EngineEventKind::TimeUpdate));
    c.handle_event(EngineEvent::new(
        stale,
        EngineEventKind::PlayRejected {
            reason: "old stream".into(),
        },
    ));

    assert_eq!(c.current_time(), 0.0);
    assert!(c.is_playing());
    assert!(c.state().resume_after_load);
    assert_eq!(c.phase(), TransportPhase::Loading(2));

    finish_load(&mut c, 100.0);
    assert!(c.is_playing());
    assert_eq!(c.engine().play_calls, 2);
}

#[test]
fn repeat_with_rejected_replay_stops_playing() {
    let mut c = controller(two_tracks());
    c.toggle_repeat();
    finish_load(&mut c, 100.0);
    c.play_pause();
    tick(&mut c, 99.0);

    c.engine_mut().reject_play = Some(EngineError::PlaybackRejected("device lost".into()));
    end_track(&mut c);
    assert!(!c.is_playing());
    assert_eq!(c.phase(), TransportPhase::Paused);
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.engine().loads.len(), 1);
}

#[test]
fn transport_actions_after_teardown_are_ignored() {
    let mut c = controller(two_tracks());
    finish_load(&mut c, 100.0);
    c.teardown();

    c.play_pause();
    c.seek(50.0);
    c.set_volume(0.9);
    assert!(!c.is_playing());
    assert_eq!(c.phase(), TransportPhase::Idle);
    assert_eq!(c.engine().play_calls, 0);
    assert!(c.engine().seeks.is_empty());
    assert_eq!(c.volume(), 0.5);
}
