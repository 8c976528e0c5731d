//! Noise: deterministic scalar fields and the grids sampled from them.
//!
//! # Invariants
//! - A field returns the same bits for the same coordinate, forever.
//! - Field output is finite and within `[-1, 1]` for finite input.
//! - Batch sampling is all-or-nothing; no partial batch is ever returned.

mod batch;
mod field;
mod heightmap;
mod mesh;

pub use batch::{BatchSampler, CpuSampler};
pub use field::{FractalField, FractalParams, NoiseField, WaveField};
pub use heightmap::{Heightmap, HeightmapParams};
pub use mesh::{TerrainMesh, WaterPlane};

/// Errors from noise construction and sampling.
#[derive(Debug, thiserror::Error)]
pub enum NoiseError {
    #[error("invalid noise parameters: {0}")]
    InvalidParams(String),
    #[error("sampler backend failed: {0}")]
    Backend(String),
    #[error("sampler produced a non-finite value: {0}")]
    NonFinite(f64),
}

pub fn crate_info() -> &'static str {
    "tilescape-noise v0.1.0"
}
