//! Tile map configuration, loadable from YAML.
//!
//! ```yaml
//! tile_size: 16
//! viewport: [800, 600]
//! margin: 2
//! sample_scale: 0.05
//! noise:
//!   kind: fractal
//!   seed: 42
//!   octaves: 4
//! bands:
//!   - { below: -0.2, terrain: water }
//!   - { below: 0.0, terrain: plains }
//!   - { below: 0.2, terrain: forest }
//!   - { below: 0.4, terrain: pines }
//! catch_all: mountain
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tilescape_classify::{ConfigError, ThresholdTable};
use tilescape_common::Terrain;
use tilescape_noise::{
    BatchSampler, CpuSampler, FractalField, FractalParams, NoiseError, NoiseField, WaveField,
};

use crate::{GridError, GridSettings, StreamingGrid};

/// Errors from loading or applying a [`TileMapConfig`].
#[derive(Debug, thiserror::Error)]
pub enum MapConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid threshold table: {0}")]
    Table(#[from] ConfigError),
    #[error("invalid noise configuration: {0}")]
    Noise(#[from] NoiseError),
    #[error("invalid grid configuration: {0}")]
    Grid(#[from] GridError),
}

/// Which field the map samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NoiseConfig {
    Fractal(FractalParams),
    Wave { frequency: f64 },
}

impl Default for NoiseConfig {
    fn default() -> Self {
        NoiseConfig::Fractal(FractalParams::default())
    }
}

/// One threshold band: samples strictly below `below` become `terrain`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    pub below: f64,
    pub terrain: Terrain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileMapConfig {
    pub tile_size: f32,
    /// Viewport width and height in pixels.
    pub viewport: [f32; 2],
    pub margin: u32,
    pub sample_scale: f64,
    pub cache: bool,
    /// Camera pan speed in pixels per frame at 60 Hz.
    pub camera_speed: f32,
    pub noise: NoiseConfig,
    pub bands: Vec<BandConfig>,
    pub catch_all: Terrain,
    /// Per-category sprite overrides; unlisted categories use their default sprite.
    pub sprites: BTreeMap<Terrain, String>,
}

impl Default for TileMapConfig {
    fn default() -> Self {
        Self::infinite_map()
    }
}

fn bands(bounds: [f64; 4]) -> Vec<BandConfig> {
    bounds
        .into_iter()
        .zip(Terrain::ALL)
        .map(|(below, terrain)| BandConfig { below, terrain })
        .collect()
}

impl TileMapConfig {
    /// Scrolling infinite map over fractal Perlin noise.
    pub fn infinite_map() -> Self {
        Self {
            tile_size: 16.0,
            viewport: [800.0, 600.0],
            margin: 2,
            sample_scale: 0.05,
            cache: true,
            camera_speed: 5.0,
            noise: NoiseConfig::Fractal(FractalParams::default()),
            bands: bands([-0.2, 0.0, 0.2, 0.4]),
            catch_all: Terrain::Mountain,
            sprites: BTreeMap::new(),
        }
    }

    /// 100 x 60 tile map over the analytic wave field.
    pub fn wave_map() -> Self {
        Self {
            viewport: [1600.0, 960.0],
            camera_speed: 2.0,
            noise: NoiseConfig::Wave { frequency: 1.0 },
            bands: bands([-0.5, 0.0, 0.3, 0.6]),
            ..Self::infinite_map()
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, MapConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, MapConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, MapConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every derived piece without building a grid.
    pub fn validate(&self) -> Result<(), MapConfigError> {
        self.grid_settings().validate()?;
        self.threshold_table()?;
        self.noise_field()?;
        Ok(())
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::from(self.viewport)
    }

    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            cell_size: self.tile_size,
            margin: self.margin,
            sample_scale: self.sample_scale,
            cache: self.cache,
        }
    }

    pub fn threshold_table(&self) -> Result<ThresholdTable<Terrain>, ConfigError> {
        ThresholdTable::new(
            self.bands.iter().map(|b| (b.below, b.terrain)).collect(),
            self.catch_all,
        )
    }

    pub fn noise_field(&self) -> Result<Box<dyn NoiseField + Send>, NoiseError> {
        Ok(match self.noise {
            NoiseConfig::Fractal(params) => Box::new(FractalField::new(params)?),
            NoiseConfig::Wave { frequency } => {
                let field = WaveField::new(frequency);
                field.validate()?;
                Box::new(field)
            }
        })
    }

    pub fn cpu_sampler(&self) -> Result<CpuSampler<Box<dyn NoiseField + Send>>, NoiseError> {
        Ok(CpuSampler::new(self.noise_field()?))
    }

    /// Sprite identifier for every category the table can produce.
    pub fn sprite_sources(&self) -> Result<Vec<(Terrain, String)>, ConfigError> {
        let table = self.threshold_table()?;
        let mut categories = table.categories().to_vec();
        categories.sort();
        categories.dedup();
        Ok(categories
            .into_iter()
            .map(|t| {
                let sprite = self
                    .sprites
                    .get(&t)
                    .cloned()
                    .unwrap_or_else(|| t.sprite().to_string());
                (t, sprite)
            })
            .collect())
    }

    /// Build a grid over `sampler` with this configuration's table and settings.
    pub fn build_grid<S: BatchSampler>(
        &self,
        sampler: S,
    ) -> Result<StreamingGrid<S, Terrain>, MapConfigError> {
        Ok(StreamingGrid::new(sampler, self.threshold_table()?, self.grid_settings())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
tile_size: 8
viewport: [320, 240]
margin: 1
noise:
  kind: fractal
  seed: 7
  octaves: 2
bands:
  - { below: -0.3, terrain: water }
  - { below: 0.5, terrain: plains }
catch_all: mountain
sprites:
  water: art/sea.png
"#;

    #[test]
    fn parses_yaml_with_defaults() {
        let config = TileMapConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.tile_size, 8.0);
        assert_eq!(config.margin, 1);
        assert_eq!(config.sample_scale, 0.05);
        assert!(config.cache);
        match config.noise {
            NoiseConfig::Fractal(p) => {
                assert_eq!(p.seed, 7);
                assert_eq!(p.octaves, 2);
                assert_eq!(p.persistence, 0.5);
            }
            other => panic!("unexpected noise config {other:?}"),
        }
        let table = config.threshold_table().unwrap();
        assert_eq!(table.classify(0.0).unwrap(), Terrain::Plains);
        assert_eq!(table.classify(0.5).unwrap(), Terrain::Mountain);
    }

    #[test]
    fn sprite_overrides_apply_per_category() {
        let config = TileMapConfig::from_yaml_str(SAMPLE).unwrap();
        let sources = config.sprite_sources().unwrap();
        assert_eq!(
            sources,
            vec![
                (Terrain::Water, "art/sea.png".to_string()),
                (Terrain::Plains, "sprites/g.png".to_string()),
                (Terrain::Mountain, "sprites/t.png".to_string()),
            ]
        );
    }

    #[test]
    fn wave_config_parses() {
        let config =
            TileMapConfig::from_yaml_str("noise: { kind: wave, frequency: 2.0 }\n").unwrap();
        assert_eq!(config.noise, NoiseConfig::Wave { frequency: 2.0 });
    }

    #[test]
    fn unsorted_bands_are_rejected() {
        let yaml =
            "bands:\n  - { below: 0.5, terrain: water }\n  - { below: 0.1, terrain: plains }\n";
        let err = TileMapConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, MapConfigError::Table(ConfigError::NotIncreasing { .. })));
    }

    #[test]
    fn rejects_nan_wave_frequency() {
        let err = TileMapConfig::from_yaml_str("noise:\n  kind: wave\n  frequency: .nan\n")
            .unwrap_err();
        assert!(matches!(err, MapConfigError::Noise(NoiseError::InvalidParams(_))));

        let yaml = "noise: { kind: wave, frequency: 0 }\n";
        let err = TileMapConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, MapConfigError::Noise(_)));
    }

    #[test]
    fn empty_bands_are_rejected() {
        let err = TileMapConfig::from_yaml_str("bands: []\n").unwrap_err();
        assert!(matches!(err, MapConfigError::Table(ConfigError::EmptyTable)));
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let err = TileMapConfig::from_yaml_str("tile_size: 0\n").unwrap_err();
        assert!(matches!(err, MapConfigError::Grid(GridError::InvalidSettings(_))));
    }

    #[test]
    fn presets_build_grids() {
        for config in [TileMapConfig::infinite_map(), TileMapConfig::wave_map()] {
            let sampler = config.cpu_sampler().unwrap();
            let mut grid = config.build_grid(sampler).unwrap();
            let count = grid
                .tiles_in_view(Vec2::ZERO, config.viewport_size())
                .unwrap()
                .count();
            assert!(count > 0);
        }
    }

    #[test]
    fn default_table_matches_infinite_preset() {
        let table = TileMapConfig::infinite_map().threshold_table().unwrap();
        assert_eq!(table, ThresholdTable::terrain_default());
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let config = TileMapConfig::wave_map();
        let text = config.to_yaml().unwrap();
        assert_eq!(TileMapConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(TileMapConfig::from_yaml_file(&path).unwrap().tile_size, 8.0);
    }
}
