use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::catalog::Catalog;
use crate::error::PlayerError;

use super::backend::{AudioBackend, AudioSession, SessionId, StatusEvent};
use super::state::{ControllerState, PlayerPhase};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ControllerState)>;

struct ActiveSession<S> {
    id: SessionId,
    index: usize,
    handle: S,
    /// Reached its end with nothing after it; resuming reloads the track.
    completed: bool,
}

/// Owns the single playback session and the transport state machine.
///
/// Every method runs on the UI thread. Status events from the backend are fed
/// in through `handle_status`; events from a session that has since been
/// replaced or released are dropped.
///
/// `phase` moves only on commands and on track completion, and `is_playing`
/// always equals `phase == Playing`. A status sample taken before a pause
/// therefore cannot flip the transport back.
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    catalog: Catalog,
    session: Option<ActiveSession<B::Session>>,
    state: ControllerState,
    autoplay: bool,
    next_session_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription_id: u64,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B, catalog: Catalog) -> Self {
        Self {
            backend,
            catalog,
            session: None,
            state: ControllerState::default(),
            autoplay: true,
            next_session_id: 1,
            subscribers: Vec::new(),
            next_subscription_id: 1,
        }
    }

    /// Whether selecting a track starts playback or leaves it paused.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Id of the live session, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Register `callback` to receive every state change.
    pub fn subscribe(&mut self, callback: impl FnMut(&ControllerState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Play the track at `index`, or toggle it when it is already current.
    pub fn select_track(&mut self, index: usize) -> Result<(), PlayerError> {
        if index >= self.catalog.len() {
            return Err(PlayerError::IndexOutOfRange {
                index,
                len: self.catalog.len(),
            });
        }

        let same_track = self.session.as_ref().is_some_and(|s| s.index == index);
        if same_track && self.state.phase.is_active() {
            return self.toggle_play_pause();
        }

        self.load(index)
    }

    /// Pause or resume the current track; from Idle/Stopped start the first one.
    pub fn toggle_play_pause(&mut self) -> Result<(), PlayerError> {
        match self.state.phase {
            PlayerPhase::Idle | PlayerPhase::Stopped => {
                if self.catalog.is_empty() {
                    return Ok(());
                }
                self.select_track(0)
            }
            PlayerPhase::Loading => Ok(()),
            PlayerPhase::Playing | PlayerPhase::Paused => {
                let Some(active) = self.session.as_mut() else {
                    return Ok(());
                };
                if active.completed {
                    let index = active.index;
                    debug!(session = %active.id, "restarting completed track");
                    return self.load(index);
                }
                if self.state.phase == PlayerPhase::Playing {
                    active.handle.pause();
                    self.state.set_phase(PlayerPhase::Paused);
                    debug!(session = %active.id, "paused");
                } else {
                    active.handle.play();
                    self.state.set_phase(PlayerPhase::Playing);
                    debug!(session = %active.id, "resumed");
                }
                self.notify();
                Ok(())
            }
        }
    }

    /// Stop and release the session and clear the current track.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.session.take() {
            active.handle.stop();
            debug!(session = %active.id, "stopped");
            active.handle.release();
            self.state.phase = PlayerPhase::Stopped;
        } else if self.state.phase != PlayerPhase::Stopped {
            self.state.phase = PlayerPhase::Idle;
        }
        self.state.clear_track();
        self.notify();
    }

    /// Advance to the following track; no-op on the last one.
    pub fn next(&mut self) -> Result<(), PlayerError> {
        match (self.state.current_index, self.catalog.last_index()) {
            (Some(i), Some(last)) if i < last => self.select_track(i + 1),
            _ => Ok(()),
        }
    }

    /// Go back to the preceding track; no-op on the first one.
    pub fn previous(&mut self) -> Result<(), PlayerError> {
        match self.state.current_index {
            Some(i) if i > 0 => self.select_track(i - 1),
            _ => Ok(()),
        }
    }

    /// Reposition the current track, clamped to its duration when known.
    ///
    /// A completed session has nothing left to seek in and is left alone.
    pub fn seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        if !self.state.phase.is_active() {
            return Ok(());
        }
        let Some(active) = self.session.as_mut() else {
            return Ok(());
        };
        if active.completed {
            trace!(session = %active.id, "seek ignored, track completed");
            return Ok(());
        }

        let target = if self.state.duration.is_zero() {
            position
        } else {
            position.min(self.state.duration)
        };

        if let Err(e) = active.handle.seek_to(target) {
            warn!(session = %active.id, error = %e, "seek failed");
            self.state.last_error = Some(e.to_string());
            self.notify();
            return Err(e);
        }

        debug!(session = %active.id, ?target, "seeked");
        self.state.position = target;
        self.notify();
        Ok(())
    }

    /// Seek relative to the last reported position, saturating at zero.
    pub fn seek_by(&mut self, offset_secs: i64) -> Result<(), PlayerError> {
        let delta = Duration::from_secs(offset_secs.unsigned_abs());
        let target = if offset_secs >= 0 {
            self.state.position.saturating_add(delta)
        } else {
            self.state.position.saturating_sub(delta)
        };
        self.seek(target)
    }

    /// Apply a status snapshot from the backend.
    ///
    /// Returns the error of an auto-advance that failed to load the next track.
    pub fn handle_status(&mut self, event: StatusEvent) -> Result<(), PlayerError> {
        let Some(active) = self.session.as_ref() else {
            trace!(session = %event.session, "dropping status, no live session");
            return Ok(());
        };
        if active.id != event.session {
            trace!(session = %event.session, live = %active.id, "dropping stale status");
            return Ok(());
        }

        let status = event.status;
        let index = active.index;
        self.state.is_loading = !status.loaded;
        self.state.duration = status.duration;
        self.state.position = if status.duration.is_zero() {
            status.position
        } else {
            status.position.min(status.duration)
        };
        if self.state.phase == PlayerPhase::Loading && status.loaded {
            self.state.set_phase(if status.playing {
                PlayerPhase::Playing
            } else {
                PlayerPhase::Paused
            });
        }

        if self.state.phase != PlayerPhase::Playing || !status.is_complete() {
            self.notify();
            return Ok(());
        }

        trace!(session = %event.session, "track complete");
        if self.catalog.last_index().is_some_and(|last| index < last) {
            self.notify();
            return self.next();
        }

        // Last track: keep the session at its end, paused.
        if let Some(active) = self.session.as_mut() {
            active.completed = true;
        }
        self.state.set_phase(PlayerPhase::Paused);
        info!(session = %event.session, index, "end of catalog");
        self.notify();
        Ok(())
    }

    /// Release the live session; the controller is left Idle.
    pub fn shutdown(&mut self) {
        self.release_session();
        self.state.phase = PlayerPhase::Idle;
        self.state.clear_track();
        self.notify();
    }

    fn load(&mut self, index: usize) -> Result<(), PlayerError> {
        self.release_session();

        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;

        self.state.phase = PlayerPhase::Loading;
        self.state.clear_track();
        self.state.current_index = Some(index);
        self.state.is_loading = true;
        self.state.last_error = None;
        self.notify();

        let track = &self.catalog[index];
        match self.backend.create(id, &track.locator, self.autoplay) {
            Ok(handle) => {
                info!(session = %id, index, track = %track.display_name, "now playing");
                self.session = Some(ActiveSession {
                    id,
                    index,
                    handle,
                    completed: false,
                });
                self.state.set_phase(if self.autoplay {
                    PlayerPhase::Playing
                } else {
                    PlayerPhase::Paused
                });
                self.state.is_loading = false;
                self.notify();
                Ok(())
            }
            Err(e) => {
                warn!(session = %id, index, error = %e, "load failed");
                self.state.phase = PlayerPhase::Idle;
                self.state.clear_track();
                self.state.last_error = Some(e.to_string());
                self.notify();
                Err(e)
            }
        }
    }

    fn release_session(&mut self) {
        if let Some(active) = self.session.take() {
            debug!(session = %active.id, index = active.index, "releasing session");
            active.handle.release();
        }
    }

    fn notify(&mut self) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.state);
        }
    }
}

impl<B: AudioBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.release_session();
    }
}
