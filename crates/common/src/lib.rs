//! Shared types: grid cells, cell ranges, terrain categories.
//!
//! # Invariants
//! - A cell is identified by its coordinate alone.
//! - Cell ranges are half-open and iterate in raster order.

mod terrain;
mod types;

pub use terrain::Terrain;
pub use types::{Cell, CellIter, CellRange};

/// Screen-space position of a drawn tile, in pixels.
pub type ScreenPosition = glam::Vec2;

pub fn crate_info() -> &'static str {
    "tilescape-common v0.1.0"
}
