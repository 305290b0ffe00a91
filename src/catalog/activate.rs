use tracing::{info, warn};

use crate::error::CatalogError;

use super::filter::ExtensionFilter;
use super::model::{Catalog, TrackDescriptor};
use super::provider::{AccessStatus, MediaProvider};

/// Builds a `Catalog` from a media provider.
pub struct MediaCatalog<P> {
    provider: P,
    filter: ExtensionFilter,
}

impl<P: MediaProvider> MediaCatalog<P> {
    pub fn new(provider: P, filter: ExtensionFilter) -> Self {
        Self { provider, filter }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Request access, enumerate, filter and sort.
    ///
    /// Every call performs a fresh enumeration.
    pub fn activate(&mut self) -> Result<Catalog, CatalogError> {
        if self.provider.request_access() == AccessStatus::Denied {
            let root = self.provider.describe();
            warn!(root = %root.display(), "media access denied");
            return Err(CatalogError::PermissionDenied { root });
        }

        let assets = self.provider.list_audio_assets()?;
        let listed = assets.len();

        let tracks: Vec<TrackDescriptor> = assets
            .into_iter()
            .filter(|a| self.filter.matches(&a.filename))
            .map(|a| TrackDescriptor {
                id: a.id,
                locator: a.uri,
                display_name: a.filename,
            })
            .collect();

        let catalog = Catalog::new(tracks);
        info!(listed, kept = catalog.len(), "catalog activated");
        Ok(catalog)
    }
}
