use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::catalog::{Catalog, TrackDescriptor};
use crate::error::PlayerError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Create(SessionId, String),
    Play(SessionId),
    Pause(SessionId),
    Stop(SessionId),
    Seek(SessionId, Duration),
    Release(SessionId),
}

#[derive(Default)]
struct Journal {
    calls: Vec<Call>,
    failing: Vec<String>,
}

impl Journal {
    fn released(&self, id: SessionId) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == Call::Release(id))
            .count()
    }

    fn created(&self) -> Vec<SessionId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Create(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

#[derive(Clone, Default)]
struct FakeBackend {
    journal: Rc<RefCell<Journal>>,
}

struct FakeSession {
    id: SessionId,
    journal: Rc<RefCell<Journal>>,
}

impl AudioBackend for FakeBackend {
    type Session = FakeSession;

    fn create(
        &mut self,
        id: SessionId,
        locator: &str,
        _autoplay: bool,
    ) -> Result<FakeSession, PlayerError> {
        let mut journal = self.journal.borrow_mut();
        if journal.failing.iter().any(|l| l == locator) {
            return Err(PlayerError::MediaLoad {
                locator: locator.to_string(),
                reason: "unreadable".to_string(),
            });
        }
        journal.calls.push(Call::Create(id, locator.to_string()));
        Ok(FakeSession {
            id,
            journal: self.journal.clone(),
        })
    }
}

impl AudioSession for FakeSession {
    fn play(&mut self) {
        self.journal.borrow_mut().calls.push(Call::Play(self.id));
    }

    fn pause(&mut self) {
        self.journal.borrow_mut().calls.push(Call::Pause(self.id));
    }

    fn stop(&mut self) {
        self.journal.borrow_mut().calls.push(Call::Stop(self.id));
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.journal
            .borrow_mut()
            .calls
            .push(Call::Seek(self.id, position));
        Ok(())
    }

    fn release(self) {
        self.journal.borrow_mut().calls.push(Call::Release(self.id));
    }
}

fn catalog(names: &[&str]) -> Catalog {
    Catalog::new(
        names
            .iter()
            .map(|n| TrackDescriptor {
                id: n.to_string(),
                locator: format!("/music/{n}"),
                display_name: n.to_string(),
            })
            .collect(),
    )
}

fn controller(names: &[&str]) -> (PlaybackController<FakeBackend>, Rc<RefCell<Journal>>) {
    let backend = FakeBackend::default();
    let journal = backend.journal.clone();
    (PlaybackController::new(backend, catalog(names)), journal)
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn status(session: SessionId, position: u64, duration: u64, playing: bool) -> StatusEvent {
    StatusEvent {
        session,
        status: SessionStatus {
            loaded: true,
            playing,
            position: ms(position),
            duration: ms(duration),
            finished: false,
        },
    }
}

#[test]
fn select_track_plays_and_releases_previous_exactly_once() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3", "c.mp3"]);

    c.select_track(0).unwrap();
    let first = c.session_id().unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert_eq!(c.state().current_index, Some(0));
    assert!(c.state().is_playing);

    c.select_track(2).unwrap();
    let second = c.session_id().unwrap();
    assert_ne!(first, second);
    assert_eq!(c.state().current_index, Some(2));
    assert_eq!(c.state().phase, PlayerPhase::Playing);

    let j = journal.borrow();
    assert_eq!(j.released(first), 1);
    assert_eq!(j.released(second), 0);
    assert_eq!(j.created(), vec![first, second]);
    // Released before the replacement was created.
    let release_at = j.calls.iter().position(|c| *c == Call::Release(first)).unwrap();
    let create_at = j
        .calls
        .iter()
        .position(|c| matches!(c, Call::Create(id, _) if *id == second))
        .unwrap();
    assert!(release_at < create_at);
}

#[test]
fn select_track_out_of_range_changes_nothing() {
    let (mut c, journal) = controller(&["a.mp3"]);
    let err = c.select_track(3).unwrap_err();
    assert_eq!(err, PlayerError::IndexOutOfRange { index: 3, len: 1 });
    assert_eq!(c.state(), &ControllerState::default());
    assert!(journal.borrow().calls.is_empty());
}

#[test]
fn selecting_current_track_toggles_instead_of_reloading() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(1).unwrap();
    let id = c.session_id().unwrap();

    c.select_track(1).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Paused);
    assert!(!c.state().is_playing);
    assert_eq!(c.session_id(), Some(id));

    c.select_track(1).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert_eq!(journal.borrow().created().len(), 1);
}

#[test]
fn toggle_twice_returns_to_playing_with_position_kept() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();
    c.handle_status(status(id, 42_000, 180_000, true)).unwrap();

    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Paused);
    assert_eq!(c.state().position, ms(42_000));

    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert!(c.state().is_playing);
    assert_eq!(c.state().position, ms(42_000));

    let j = journal.borrow();
    assert!(j.calls.contains(&Call::Pause(id)));
    assert!(j.calls.contains(&Call::Play(id)));
}

#[test]
fn toggle_from_idle_starts_first_track() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().current_index, Some(0));
    assert_eq!(c.state().phase, PlayerPhase::Playing);
}

#[test]
fn toggle_on_empty_catalog_is_noop() {
    let (mut c, journal) = controller(&[]);
    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Idle);
    assert_eq!(c.state().current_index, None);
    assert!(journal.borrow().calls.is_empty());
}

#[test]
fn next_and_previous_stay_in_bounds() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3", "c.mp3"]);

    // Nothing current: both are no-ops.
    c.next().unwrap();
    c.previous().unwrap();
    assert_eq!(c.state().current_index, None);

    c.select_track(0).unwrap();
    c.previous().unwrap();
    assert_eq!(c.state().current_index, Some(0));
    assert_eq!(journal.borrow().created().len(), 1);

    for expected in [1, 2, 2, 2] {
        c.next().unwrap();
        assert_eq!(c.state().current_index, Some(expected));
    }
    assert_eq!(journal.borrow().created().len(), 3);

    for expected in [1, 0, 0] {
        c.previous().unwrap();
        assert_eq!(c.state().current_index, Some(expected));
    }
}

#[test]
fn boundary_next_leaves_state_unchanged() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(1).unwrap();
    let id = c.session_id().unwrap();
    c.handle_status(status(id, 1_000, 200_000, true)).unwrap();
    let before = c.state().clone();

    c.next().unwrap();
    assert_eq!(c.state(), &before);
    assert_eq!(c.session_id(), Some(id));
}

#[test]
fn completion_auto_advances_to_next_track() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(0).unwrap();
    let first = c.session_id().unwrap();

    c.handle_status(status(first, 180_000, 180_000, false)).unwrap();

    assert_eq!(c.state().current_index, Some(1));
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert!(c.state().is_playing);
    assert_eq!(journal.borrow().released(first), 1);
}

#[test]
fn finished_flag_advances_even_without_duration() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();

    let mut event = status(id, 3_000, 0, false);
    event.status.finished = true;
    c.handle_status(event).unwrap();

    assert_eq!(c.state().current_index, Some(1));
}

#[test]
fn completion_on_last_track_pauses_at_the_end() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(1).unwrap();
    let id = c.session_id().unwrap();

    c.handle_status(status(id, 200_000, 200_000, false)).unwrap();

    assert_eq!(c.state().current_index, Some(1));
    assert_eq!(c.state().phase, PlayerPhase::Paused);
    assert!(!c.state().is_playing);
    assert_eq!(c.state().position, ms(200_000));
    assert_eq!(c.session_id(), Some(id));
    assert_eq!(journal.borrow().released(id), 0);

    // Further end-of-track samples change nothing.
    c.handle_status(status(id, 200_000, 200_000, false)).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Paused);
    assert_eq!(journal.borrow().created(), vec![id]);
}

#[test]
fn play_after_last_track_completes_restarts_it() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(1).unwrap();
    let old = c.session_id().unwrap();
    c.handle_status(status(old, 200_000, 200_000, false)).unwrap();

    c.toggle_play_pause().unwrap();

    let new = c.session_id().unwrap();
    assert_ne!(old, new);
    assert_eq!(c.state().current_index, Some(1));
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert!(c.state().is_playing);
    assert_eq!(c.state().position, Duration::ZERO);
    assert_eq!(journal.borrow().released(old), 1);

    // A late sample from the finished session is ignored.
    c.handle_status(status(old, 200_000, 200_000, false)).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert_eq!(c.state().position, Duration::ZERO);
}

#[test]
fn seek_on_completed_track_is_noop() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();
    c.handle_status(status(id, 90_000, 90_000, false)).unwrap();

    c.seek(ms(10_000)).unwrap();
    c.seek_by(-5).unwrap();

    assert_eq!(c.state().position, ms(90_000));
    assert!(!journal
        .borrow()
        .calls
        .iter()
        .any(|call| matches!(call, Call::Seek(..))));
}

#[test]
fn sample_taken_before_pause_does_not_swallow_resume() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();
    c.toggle_play_pause().unwrap();

    // Sampled while still playing, delivered after the pause.
    c.handle_status(status(id, 1_000, 180_000, true)).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Paused);
    assert!(!c.state().is_playing);
    assert_eq!(c.state().position, ms(1_000));

    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert!(c.state().is_playing);
    let j = journal.borrow();
    assert_eq!(j.calls.last(), Some(&Call::Play(id)));
    assert_eq!(
        j.calls.iter().filter(|call| **call == Call::Pause(id)).count(),
        1
    );
}

#[test]
fn state_flags_agree_with_phase_after_every_status() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();

    // A sample claiming paused while the transport is playing.
    c.handle_status(status(id, 2_000, 180_000, false)).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert!(c.state().is_playing);

    c.toggle_play_pause().unwrap();
    c.handle_status(status(id, 2_500, 180_000, true)).unwrap();
    assert_eq!(c.state().is_playing, c.state().phase == PlayerPhase::Playing);
}

#[test]
fn zero_duration_status_does_not_advance() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();

    c.handle_status(status(id, 0, 0, true)).unwrap();
    assert_eq!(c.state().current_index, Some(0));
}

#[test]
fn stop_always_clears_track_state() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3"]);

    c.stop();
    assert_eq!(c.state().current_index, None);
    assert_eq!(c.state().position, Duration::ZERO);
    assert!(!c.state().is_playing);
    assert_eq!(c.state().phase, PlayerPhase::Idle);

    c.select_track(1).unwrap();
    let id = c.session_id().unwrap();
    c.handle_status(status(id, 5_000, 200_000, true)).unwrap();
    c.toggle_play_pause().unwrap();

    c.stop();
    assert_eq!(c.state().current_index, None);
    assert_eq!(c.state().position, Duration::ZERO);
    assert!(!c.state().is_playing);
    assert_eq!(c.state().phase, PlayerPhase::Stopped);
    assert_eq!(c.session_id(), None);

    let j = journal.borrow();
    assert!(j.calls.contains(&Call::Stop(id)));
    assert_eq!(j.released(id), 1);
}

#[test]
fn toggle_after_stop_restarts_from_first_track() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    c.select_track(1).unwrap();
    c.stop();

    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().current_index, Some(0));
    assert_eq!(c.state().phase, PlayerPhase::Playing);
}

#[test]
fn seek_clamps_to_known_duration() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();
    c.handle_status(status(id, 1_000, 180_000, true)).unwrap();

    c.seek(ms(500_000)).unwrap();
    assert_eq!(c.state().position, ms(180_000));
    assert!(journal.borrow().calls.contains(&Call::Seek(id, ms(180_000))));

    c.seek_by(-1_000).unwrap();
    assert_eq!(c.state().position, Duration::ZERO);
}

#[test]
fn seek_without_session_is_noop() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.seek(ms(10_000)).unwrap();
    c.seek_by(5).unwrap();
    assert_eq!(c.state().position, Duration::ZERO);
    assert!(journal.borrow().calls.is_empty());
}

#[test]
fn stale_status_events_are_discarded() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3", "c.mp3"]);
    c.select_track(0).unwrap();
    let old = c.session_id().unwrap();
    c.select_track(2).unwrap();
    let current = c.session_id().unwrap();
    c.handle_status(status(current, 2_000, 100_000, true)).unwrap();

    // A completion from the replaced session must not move the pointer.
    c.handle_status(status(old, 180_000, 180_000, false)).unwrap();
    assert_eq!(c.state().current_index, Some(2));
    assert_eq!(c.state().position, ms(2_000));

    c.stop();
    c.handle_status(status(current, 9_000, 100_000, true)).unwrap();
    assert_eq!(c.state().position, Duration::ZERO);
    assert_eq!(c.state().current_index, None);
}

#[test]
fn load_failure_reverts_to_idle_and_reports() {
    let (mut c, journal) = controller(&["a.mp3", "b.mp3"]);
    journal.borrow_mut().failing.push("/music/b.mp3".to_string());

    c.select_track(0).unwrap();
    let first = c.session_id().unwrap();

    let err = c.select_track(1).unwrap_err();
    assert!(matches!(err, PlayerError::MediaLoad { .. }));
    assert_eq!(c.state().phase, PlayerPhase::Idle);
    assert_eq!(c.state().current_index, None);
    assert!(!c.state().is_playing);
    assert!(c.state().last_error.as_deref().unwrap().contains("unreadable"));
    assert_eq!(c.session_id(), None);
    assert_eq!(journal.borrow().released(first), 1);

    // Still interactive afterwards, and a good load clears the error.
    c.select_track(0).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
    assert_eq!(c.state().last_error, None);
}

#[test]
fn two_track_scenario() {
    let (mut c, journal) = controller(&["A.mp3", "B.mp3"]);

    c.select_track(0).unwrap();
    assert_eq!(c.state().current_index, Some(0));
    assert!(c.state().is_playing);
    let a = c.session_id().unwrap();

    c.handle_status(status(a, 180_000, 180_000, true)).unwrap();
    assert_eq!(c.state().current_index, Some(1));
    assert!(c.state().is_playing);
    let b = c.session_id().unwrap();

    c.seek(ms(50_000)).unwrap();
    assert!(journal.borrow().calls.contains(&Call::Seek(b, ms(50_000))));
    c.handle_status(status(b, 50_000, 200_000, true)).unwrap();
    assert_eq!(c.state().position, ms(50_000));

    c.previous().unwrap();
    assert_eq!(c.state().current_index, Some(0));
}

#[test]
fn subscribers_see_every_change_until_unsubscribed() {
    let (mut c, _) = controller(&["a.mp3", "b.mp3"]);
    let seen: Rc<RefCell<Vec<PlayerPhase>>> = Rc::default();
    let sink = seen.clone();
    let sub = c.subscribe(move |s| sink.borrow_mut().push(s.phase));

    c.select_track(0).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![PlayerPhase::Loading, PlayerPhase::Playing]
    );

    assert!(c.unsubscribe(sub));
    assert!(!c.unsubscribe(sub));
    c.toggle_play_pause().unwrap();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn autoplay_off_loads_paused() {
    let backend = FakeBackend::default();
    let mut c = PlaybackController::new(backend, catalog(&["a.mp3"])).with_autoplay(false);
    c.select_track(0).unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Paused);
    assert!(!c.state().is_playing);

    c.toggle_play_pause().unwrap();
    assert_eq!(c.state().phase, PlayerPhase::Playing);
}

#[test]
fn dropping_controller_releases_live_session() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();
    drop(c);
    assert_eq!(journal.borrow().released(id), 1);
}

#[test]
fn shutdown_releases_once_and_drop_does_not_repeat() {
    let (mut c, journal) = controller(&["a.mp3"]);
    c.select_track(0).unwrap();
    let id = c.session_id().unwrap();
    c.shutdown();
    assert_eq!(c.state().phase, PlayerPhase::Idle);
    drop(c);
    assert_eq!(journal.borrow().released(id), 1);
}
