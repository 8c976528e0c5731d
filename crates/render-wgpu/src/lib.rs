//! wgpu render backend for streaming tile maps.
//!
//! Every visible tile is drawn as one instanced screen-space quad filled with
//! its asset's mean colour.
//!
//! # Invariants
//! - The renderer only sees assets and screen positions, never the grid.
//! - Screen positions are pixels from the viewport's top-left, +y down.

mod batch;
mod gpu;
mod shaders;

pub use batch::{QuadBatch, QuadInstance, pixel_to_ndc, srgb_to_linear};
pub use gpu::QuadRenderer;
