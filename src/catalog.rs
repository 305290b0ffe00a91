//! Track catalog: media provider access, format filtering and ordering.
//!
//! `MediaCatalog` is activated once at startup and yields the ordered
//! `Catalog` that seeds the playback controller.

mod activate;
mod filter;
mod fs;
mod model;
mod provider;

pub use activate::MediaCatalog;
pub use filter::ExtensionFilter;
pub use fs::FsMediaProvider;
pub use model::{Catalog, TrackDescriptor};
pub use provider::{AccessStatus, AudioAsset, MediaProvider};
