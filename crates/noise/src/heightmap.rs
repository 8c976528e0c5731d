//! Square heightmaps for the scrolling 3D terrain.
//!
//! Samples are taken at `((i + offset_x) / scale, j / scale)`, min-max
//! normalized to `[-1, 1]` and multiplied by `height_scale`. The band layout
//! of the 2D tile map is unrelated; heightmaps carry their own parameters.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{BatchSampler, FractalParams, NoiseError};

/// Configuration for heightmap generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightmapParams {
    /// Side length in samples.
    pub size: usize,
    /// World units per noise unit; larger values give broader hills.
    pub scale: f64,
    /// Peak absolute height after normalization.
    pub height_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub seed: u32,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            size: 128,
            scale: 40.0,
            height_scale: 10.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 0,
        }
    }
}

impl HeightmapParams {
    /// Taller, more detailed preset.
    pub fn detailed() -> Self {
        Self {
            height_scale: 17.0,
            octaves: 8,
            lacunarity: 2.1,
            ..Self::default()
        }
    }

    /// Field parameters matching this heightmap's octave configuration.
    pub fn fractal_params(&self) -> FractalParams {
        FractalParams {
            seed: self.seed,
            octaves: self.octaves,
            scale: 1.0,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
        }
    }

    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.size < 2 {
            return Err(NoiseError::InvalidParams(format!(
                "heightmap size must be at least 2, got {}",
                self.size
            )));
        }
        for (name, value) in [("scale", self.scale), ("height_scale", self.height_scale)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(NoiseError::InvalidParams(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A `size x size` grid of heights, indexed `[i * size + j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    size: usize,
    height_scale: f64,
    offset_x: f64,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Sample and normalize a heightmap starting at `offset_x` along the i axis.
    pub fn generate<S: BatchSampler + ?Sized>(
        sampler: &mut S,
        params: &HeightmapParams,
        offset_x: f64,
    ) -> Result<Self, NoiseError> {
        params.validate()?;
        let _span =
            tracing::debug_span!("heightmap_generate", size = params.size, offset_x).entered();

        let size = params.size;
        let mut points = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                points.push(DVec2::new(
                    (i as f64 + offset_x) / params.scale,
                    j as f64 / params.scale,
                ));
            }
        }

        let raw = sampler.sample_points(&points)?;
        if raw.len() != points.len() {
            return Err(NoiseError::Backend(format!(
                "sampler returned {} values for {} points",
                raw.len(),
                points.len()
            )));
        }
        if let Some(bad) = raw.iter().find(|v| !v.is_finite()) {
            return Err(NoiseError::NonFinite(*bad));
        }

        let (min, max) = raw
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = max - min;

        let heights = raw
            .iter()
            .map(|&v| {
                let unit = if span > 0.0 { (v - min) / span * 2.0 - 1.0 } else { 0.0 };
                (unit * params.height_scale) as f32
            })
            .collect();

        Ok(Self {
            size,
            height_scale: params.height_scale,
            offset_x,
            heights,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Offset along the i axis this heightmap was sampled at.
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.size || j >= self.size {
            return None;
        }
        self.heights.get(i * self.size + j).copied()
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn min(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}
