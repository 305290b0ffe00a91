//! Audio-session capability consumed by the controller.
//!
//! A backend builds sessions; each session pushes `StatusEvent`s tagged with
//! its `SessionId` into the channel the backend was constructed with.

use std::fmt;
use std::time::Duration;

use crate::error::PlayerError;

/// Identity of one session, allocated by the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot reported by a live session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub loaded: bool,
    pub playing: bool,
    pub position: Duration,
    /// `Duration::ZERO` while unknown.
    pub duration: Duration,
    /// Set once the source has played to its end.
    pub finished: bool,
}

impl SessionStatus {
    /// Whether this snapshot marks the end of the track.
    pub fn is_complete(&self) -> bool {
        self.loaded
            && (self.finished || (!self.duration.is_zero() && self.position >= self.duration))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub session: SessionId,
    pub status: SessionStatus,
}

pub trait AudioBackend {
    type Session: AudioSession;

    /// Build a session for `locator`; starts playing right away when `autoplay`.
    fn create(
        &mut self,
        id: SessionId,
        locator: &str,
        autoplay: bool,
    ) -> Result<Self::Session, PlayerError>;
}

pub trait AudioSession {
    fn play(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError>;

    /// Free the underlying decoder and output handle. Consumes the session.
    fn release(self);
}
