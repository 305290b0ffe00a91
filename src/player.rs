//! Transport control: the single-session playback state machine.
//!
//! `PlaybackController` owns at most one `AudioSession` at a time and turns
//! transport commands and session status events into `ControllerState`.

mod backend;
mod controller;
mod rodio_backend;
mod state;

pub use backend::{AudioBackend, AudioSession, SessionId, SessionStatus, StatusEvent};
pub use controller::{PlaybackController, SubscriptionId};
pub use rodio_backend::RodioBackend;
pub use state::{ControllerState, PlayerPhase};

#[cfg(test)]
mod tests;
