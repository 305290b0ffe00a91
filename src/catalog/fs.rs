use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::CatalogError;

use super::provider::{AccessStatus, AudioAsset, MediaProvider};

/// Media provider backed by a directory tree on the local filesystem.
pub struct FsMediaProvider {
    root: PathBuf,
    follow_links: bool,
    include_hidden: bool,
    recursive: bool,
    max_depth: Option<usize>,
}

impl FsMediaProvider {
    pub fn new(root: impl Into<PathBuf>, settings: &LibrarySettings) -> Self {
        Self {
            root: root.into(),
            follow_links: settings.follow_links,
            include_hidden: settings.include_hidden,
            recursive: settings.recursive,
            max_depth: settings.max_depth,
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

impl MediaProvider for FsMediaProvider {
    /// Access is granted when the root is a directory we can list.
    fn request_access(&mut self) -> AccessStatus {
        match fs::read_dir(&self.root) {
            Ok(_) => AccessStatus::Granted,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "media root not readable");
                AccessStatus::Denied
            }
        }
    }

    fn list_audio_assets(&mut self) -> Result<Vec<AudioAsset>, CatalogError> {
        let mut walker = WalkDir::new(&self.root).follow_links(self.follow_links);

        // Non-recursive = only the root directory.
        let depth_cap = if self.recursive {
            self.max_depth
        } else {
            Some(1)
        };
        if let Some(d) = depth_cap {
            walker = walker.max_depth(d);
        }

        let include_hidden = self.include_hidden;
        let mut assets = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(CatalogError::Enumerate(e.to_string()));
                }
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.path().is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str() else {
                debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };

            let path = entry.path();
            let id = path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();

            assets.push(AudioAsset {
                id,
                uri: path.to_string_lossy().into_owned(),
                filename: filename.to_string(),
            });
        }

        Ok(assets)
    }

    fn describe(&self) -> PathBuf {
        self.root.clone()
    }
}
