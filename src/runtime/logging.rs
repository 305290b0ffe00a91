use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install a file-backed `tracing` subscriber; the terminal belongs to the TUI.
///
/// `TAPEDECK_LOG` overrides `log.level`. Returns the log file path.
pub fn init(settings: &LogSettings) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = match &settings.file {
        Some(p) => p.clone(),
        None => default_log_path(std::env::var_os("XDG_STATE_HOME"), std::env::var_os("HOME"))
            .ok_or("cannot determine a log file location")?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env("TAPEDECK_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok(path)
}

/// `$XDG_STATE_HOME/tapedeck/tapedeck.log`, else `~/.local/state/tapedeck/tapedeck.log`.
fn default_log_path(xdg_state_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let state_home = match xdg_state_home {
        Some(xdg) => Some(PathBuf::from(xdg)),
        None => home.map(|h| PathBuf::from(h).join(".local").join("state")),
    };
    state_home.map(|d| d.join("tapedeck").join("tapedeck.log"))
}
