use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, warn};

use crate::app::App;
use crate::config;
use crate::error::PlayerError;
use crate::player::{AudioBackend, PlaybackController, StatusEvent};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    pending_zz: bool,
}

impl EventLoopState {
    fn clear_prefixes(&mut self) {
        self.pending_gg = false;
        self.pending_zz = false;
    }
}

/// Main terminal event loop: drains session status, draws, and dispatches
/// keys to the controller. Returns `Ok(())` when shutdown is requested.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<B>,
    status_rx: &mpsc::Receiver<StatusEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(event) = status_rx.try_recv() {
            report(controller.handle_status(event));
        }

        app.sync_with_playback(controller.state().current_index);

        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                controller.catalog(),
                controller.state(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Transport failures are already in the controller state for display;
/// an out-of-range index is a bug in the caller.
fn report(result: Result<(), PlayerError>) {
    match result {
        Ok(()) => {}
        Err(e @ PlayerError::IndexOutOfRange { .. }) => error!(error = %e, "bad track index"),
        Err(e) => warn!(error = %e, "transport command failed"),
    }
}

/// Returns true when the user asked to quit.
fn handle_key_event<B: AudioBackend>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<B>,
    state: &mut EventLoopState,
) -> bool {
    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => {
            state.clear_prefixes();
            controller.shutdown();
            return true;
        }
        KeyCode::Char('g') => {
            state.pending_zz = false;
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.clear_prefixes();
            app.follow_playback_off();
            app.last();
        }
        KeyCode::Char('z') => {
            state.pending_gg = false;
            if state.pending_zz {
                state.pending_zz = false;
                if let Some(idx) = controller.state().current_index {
                    app.set_selected(idx);
                }
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.clear_prefixes();
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.clear_prefixes();
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            state.clear_prefixes();
            if app.has_tracks() {
                app.clear_notice();
                app.follow_playback_on();
                report(controller.select_track(app.selected));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.clear_prefixes();
            app.clear_notice();
            app.follow_playback_on();
            report(controller.toggle_play_pause());
        }
        KeyCode::Char('l') => {
            state.clear_prefixes();
            app.follow_playback_on();
            report(controller.next());
        }
        KeyCode::Char('h') => {
            state.clear_prefixes();
            app.follow_playback_on();
            report(controller.previous());
        }
        KeyCode::Char('L') => {
            state.clear_prefixes();
            report(controller.seek_by(scrub));
        }
        KeyCode::Char('H') => {
            state.clear_prefixes();
            report(controller.seek_by(-scrub));
        }
        KeyCode::Char('s') => {
            state.clear_prefixes();
            controller.stop();
        }
        KeyCode::Char(_) => {
            // Prefixes clear on any other printable char.
            state.clear_prefixes();
        }
        _ => {}
    }

    false
}
