//! Scrolling heightmap for the 3D terrain flythrough.
//!
//! The camera glides along +x at a constant speed. Once it has travelled
//! `regen_distance` units the render offset snaps back to zero, the sampling
//! window advances by `step` samples and the heightmap is rebuilt.

use std::time::{Duration, Instant};

use tilescape_noise::{BatchSampler, Heightmap, HeightmapParams, NoiseError, TerrainMesh};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlythroughSettings {
    /// Camera speed in world units per second.
    pub speed: f32,
    /// Travel distance that triggers a regeneration.
    pub regen_distance: f32,
    /// Samples the terrain window advances per regeneration.
    pub step: f64,
}

impl Default for FlythroughSettings {
    fn default() -> Self {
        Self {
            speed: 15.0,
            regen_distance: 50.0,
            step: 16.0,
        }
    }
}

pub struct Flythrough<S> {
    sampler: S,
    params: HeightmapParams,
    settings: FlythroughSettings,
    terrain_offset: f64,
    travelled: f32,
    heightmap: Heightmap,
    mesh: TerrainMesh,
    regenerations: u64,
    last_generation: Duration,
}

impl<S: BatchSampler> Flythrough<S> {
    /// Generate the initial terrain at offset zero.
    pub fn new(
        mut sampler: S,
        params: HeightmapParams,
        settings: FlythroughSettings,
    ) -> Result<Self, NoiseError> {
        let start = Instant::now();
        let heightmap = Heightmap::generate(&mut sampler, &params, 0.0)?;
        let mesh = TerrainMesh::from_heightmap(&heightmap);
        let last_generation = start.elapsed();
        tracing::info!(
            elapsed = ?last_generation,
            backend = sampler.backend(),
            "initial terrain generated"
        );

        Ok(Self {
            sampler,
            params,
            settings,
            terrain_offset: 0.0,
            travelled: 0.0,
            heightmap,
            mesh,
            regenerations: 0,
            last_generation,
        })
    }

    /// Advance the camera by `dt` seconds. Returns `true` when the terrain was rebuilt.
    pub fn advance(&mut self, dt: f32) -> Result<bool, NoiseError> {
        self.travelled += self.settings.speed * dt.max(0.0);
        if self.travelled <= self.settings.regen_distance {
            return Ok(false);
        }

        let next_offset = self.terrain_offset + self.settings.step;
        let start = Instant::now();
        let heightmap = Heightmap::generate(&mut self.sampler, &self.params, next_offset)?;
        self.mesh = TerrainMesh::from_heightmap(&heightmap);
        self.heightmap = heightmap;
        self.terrain_offset = next_offset;
        self.travelled = 0.0;
        self.regenerations += 1;
        self.last_generation = start.elapsed();

        tracing::info!(
            offset = self.terrain_offset,
            elapsed = ?self.last_generation,
            "terrain regenerated"
        );
        Ok(true)
    }

    /// Smooth translation to apply to the mesh this frame.
    pub fn render_offset(&self) -> f32 {
        self.travelled
    }

    pub fn terrain_offset(&self) -> f64 {
        self.terrain_offset
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    pub fn last_generation(&self) -> Duration {
        self.last_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilescape_noise::{CpuSampler, FractalField};

    fn flythrough() -> Flythrough<CpuSampler<FractalField>> {
        let params = HeightmapParams {
            size: 16,
            ..HeightmapParams::default()
        };
        let sampler = CpuSampler::new(FractalField::new(params.fractal_params()).unwrap());
        Flythrough::new(sampler, params, FlythroughSettings::default()).unwrap()
    }

    #[test]
    fn glides_without_regenerating_below_threshold() {
        let mut fly = flythrough();
        assert!(!fly.advance(1.0).unwrap());
        assert!(!fly.advance(2.0).unwrap());
        assert_eq!(fly.render_offset(), 45.0);
        assert_eq!(fly.regenerations(), 0);
    }

    #[test]
    fn regenerates_past_threshold() {
        let mut fly = flythrough();
        let before = fly.heightmap().clone();
        assert!(fly.advance(4.0).unwrap());
        assert_eq!(fly.render_offset(), 0.0);
        assert_eq!(fly.terrain_offset(), 16.0);
        assert_eq!(fly.regenerations(), 1);
        assert_eq!(fly.heightmap().offset_x(), 16.0);
        assert_ne!(fly.heightmap(), &before);
        assert_eq!(fly.mesh().vertex_count(), 256);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut fly = flythrough();
        fly.advance(-5.0).unwrap();
        assert_eq!(fly.render_offset(), 0.0);
    }
}
