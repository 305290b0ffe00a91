use crate::error::CatalogError;

/// Outcome of asking the host for media access.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessStatus {
    Granted,
    Denied,
}

/// Raw asset as listed by a provider, before filtering and sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub id: String,
    pub uri: String,
    pub filename: String,
}

/// Source of audio assets. Filtering and ordering are not the provider's job.
pub trait MediaProvider {
    fn request_access(&mut self) -> AccessStatus;

    fn list_audio_assets(&mut self) -> Result<Vec<AudioAsset>, CatalogError>;

    /// Human-readable location used in permission messages.
    fn describe(&self) -> std::path::PathBuf;
}
