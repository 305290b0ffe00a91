//! View model for the track list.

/// Cursor and notice state for the terminal UI.
pub struct App {
    pub track_count: usize,
    pub selected: usize,

    /// When on, the cursor jumps to whatever track is playing.
    pub follow_playback: bool,

    /// One-line message for the user (permission problems, load errors).
    pub notice: Option<String>,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` for a catalog of `track_count` tracks.
    pub fn new(track_count: usize) -> Self {
        Self {
            track_count,
            selected: 0,
            follow_playback: true,
            notice: None,
            current_dir: None,
        }
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        self.track_count > 0
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn set_notice(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Move the cursor to `idx`, clamped to the list.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.track_count.saturating_sub(1));
    }

    /// Point the cursor at the playing track when following playback.
    pub fn sync_with_playback(&mut self, current: Option<usize>) {
        if !self.follow_playback {
            return;
        }
        if let Some(idx) = current {
            if idx != self.selected {
                self.set_selected(idx);
            }
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.track_count;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = if self.selected == 0 {
                self.track_count - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.track_count.saturating_sub(1);
    }
}
