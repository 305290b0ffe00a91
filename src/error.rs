//! Error types shared by the catalog and the playback controller.
//!
//! None of these are fatal to the process except `PlayerError::AudioOutput`,
//! which is raised before the terminal is taken over.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while building the track catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The media provider refused access; the catalog stays empty.
    #[error("permission to read media in {} was denied", root.display())]
    PermissionDenied { root: PathBuf },

    /// Enumeration started but the provider could not list its assets.
    #[error("failed to enumerate audio files: {0}")]
    Enumerate(String),
}

/// Failures raised by the playback controller or an audio backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// A session could not be built for the track's resource.
    #[error("cannot load {locator}: {reason}")]
    MediaLoad { locator: String, reason: String },

    /// `select_track` was called with an index outside the catalog.
    #[error("track index {index} out of range (catalog has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("seek failed: {0}")]
    Seek(String),

    /// No audio output device could be opened.
    #[error("audio output unavailable: {0}")]
    AudioOutput(String),
}
