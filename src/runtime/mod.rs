use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::catalog::MediaProvider;
use crate::catalog::{Catalog, ExtensionFilter, FsMediaProvider, MediaCatalog};
use crate::config::Settings;
use crate::player::{PlaybackController, PlayerPhase, RodioBackend, StatusEvent};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    match logging::init(&settings.log) {
        Ok(path) => debug!(path = %path.display(), "logging initialised"),
        Err(e) => eprintln!("tapedeck: logging disabled: {e}"),
    }
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }

    let dir = resolve_music_dir(arg, &settings);
    info!(dir = %dir.display(), "starting");

    let (catalog, notice) = activate_catalog(&dir, &settings);

    let (status_tx, status_rx) = mpsc::channel::<StatusEvent>();
    let backend = RodioBackend::new(
        status_tx,
        Duration::from_millis(settings.playback.status_interval_ms),
    )?;
    let mut controller =
        PlaybackController::new(backend, catalog).with_autoplay(settings.playback.autoplay);

    let mut last_phase = PlayerPhase::Idle;
    controller.subscribe(move |s| {
        if s.phase != last_phase {
            debug!(from = ?last_phase, to = ?s.phase, index = ?s.current_index, "phase changed");
            last_phase = s.phase;
        }
    });

    let mut app = App::new(controller.catalog().len());
    app.follow_playback = settings.ui.follow_playback;
    app.set_current_dir(dir.display().to_string());
    if let Some(msg) = notice {
        app.set_notice(msg);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut controller,
            &status_rx,
            &mut state,
        )
    })();

    controller.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

/// Command-line argument, then `library.root`, then the working directory.
fn resolve_music_dir(arg: Option<String>, settings: &Settings) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"))
}

/// A denied or failed enumeration leaves the catalog empty with a notice.
fn activate_catalog(dir: &std::path::Path, settings: &Settings) -> (Catalog, Option<String>) {
    let provider = FsMediaProvider::new(dir, &settings.library);
    let filter = ExtensionFilter::new(&settings.library.extensions, settings.library.case_sensitive);
    let mut media = MediaCatalog::new(provider, filter);

    match media.activate() {
        Ok(catalog) if catalog.is_empty() => (catalog, Some("no audio files found".to_string())),
        Ok(catalog) => (catalog, None),
        Err(e) => {
            let root = media.provider().describe();
            warn!(root = %root.display(), error = %e, "catalog unavailable");
            (Catalog::default(), Some(e.to_string()))
        }
    }
}
