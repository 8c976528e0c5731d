//! Tile assets: resource stores, decoding, and the per-category atlas.
//!
//! The renderer consumes assets by category through the atlas, never by raw
//! resource identifiers.
//!
//! # Invariants
//! - Each category's asset is materialized at most once per atlas.
//! - Concurrent first access never decodes twice or yields distinct instances.

mod asset;
mod atlas;
mod store;

pub use asset::{Asset, encode_swatch};
pub use atlas::TileAtlas;
pub use store::{FsStore, MemoryStore, ResourceStore};

/// Underlying reason an asset could not be materialized.
#[derive(Debug, thiserror::Error)]
pub enum LoadCause {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("no resource registered for this category")]
    Unregistered,
}

/// Asset for a category is missing or corrupt.
#[derive(Debug, thiserror::Error)]
#[error("failed to load asset for {category:?} from `{identifier}`: {cause}")]
pub struct ResourceLoadError<C> {
    pub category: C,
    pub identifier: String,
    #[source]
    pub cause: LoadCause,
}

pub fn crate_info() -> &'static str {
    "tilescape-assets v0.1.0"
}
