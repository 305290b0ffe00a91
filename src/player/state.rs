use std::time::Duration;

/// Coarse transport phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlayerPhase {
    /// Nothing selected yet, or the last load failed.
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    /// Explicitly stopped by the user.
    Stopped,
}

impl PlayerPhase {
    /// Whether a session is live and can be paused, resumed or seeked.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

/// Read-only view of the controller handed to the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub phase: PlayerPhase,
    pub current_index: Option<usize>,
    /// Always `phase == Playing`.
    pub is_playing: bool,
    pub position: Duration,
    pub duration: Duration,
    pub is_loading: bool,
    /// Message of the last load or seek failure, cleared by the next load.
    pub last_error: Option<String>,
}

impl ControllerState {
    /// Move to `phase`, keeping `is_playing` in step with it.
    pub(super) fn set_phase(&mut self, phase: PlayerPhase) {
        self.phase = phase;
        self.is_playing = phase == PlayerPhase::Playing;
    }

    /// Zero position and duration and clear the current track.
    pub(super) fn clear_track(&mut self) {
        self.current_index = None;
        self.is_playing = false;
        self.is_loading = false;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
    }
}
