use std::cmp::Ordering;
use std::ops::Index;

/// One playable entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Provider-assigned identity, unique within one enumeration.
    pub id: String,
    /// Resource reference handed to the audio backend as-is.
    pub locator: String,
    pub display_name: String,
}

/// Ordered, immutable list of tracks produced by one catalog activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<TrackDescriptor>,
}

impl Catalog {
    /// Build a catalog, sorting `tracks` by display name.
    pub fn new(mut tracks: Vec<TrackDescriptor>) -> Self {
        tracks.sort_by(compare_tracks);
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackDescriptor> {
        self.tracks.get(index)
    }

    /// Index of the final track, `None` for an empty catalog.
    pub fn last_index(&self) -> Option<usize> {
        self.tracks.len().checked_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackDescriptor> {
        self.tracks.iter()
    }
}

impl Index<usize> for Catalog {
    type Output = TrackDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tracks[index]
    }
}

/// Case-insensitive by display name, then exact name, then id, so the
/// order is total for any snapshot.
pub(super) fn compare_tracks(a: &TrackDescriptor, b: &TrackDescriptor) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.id.cmp(&b.id))
}
