use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::NoiseError;

/// A continuous scalar field over the plane.
///
/// Implementations must return a finite value in `[-1, 1]` for every finite
/// input and must be deterministic: the same coordinate always yields the
/// same bits for the lifetime of the field.
pub trait NoiseField {
    fn sample(&self, x: f64, y: f64) -> f64;
}

impl<F: NoiseField + ?Sized> NoiseField for &F {
    fn sample(&self, x: f64, y: f64) -> f64 {
        (**self).sample(x, y)
    }
}

impl<F: NoiseField + ?Sized> NoiseField for Box<F> {
    fn sample(&self, x: f64, y: f64) -> f64 {
        (**self).sample(x, y)
    }
}

/// Parameters for a fractal (multi-octave) Perlin field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParams {
    pub seed: u32,
    /// Number of summed octaves. Must be at least 1.
    pub octaves: u32,
    /// Frequency of the first octave.
    pub scale: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            seed: 42,
            octaves: 4,
            scale: 1.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl FractalParams {
    fn validate(&self) -> Result<(), NoiseError> {
        if self.octaves == 0 {
            return Err(NoiseError::InvalidParams("octaves must be at least 1".into()));
        }
        for (name, value) in [
            ("scale", self.scale),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(NoiseError::InvalidParams(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Fractal Brownian motion over Perlin noise.
///
/// Octaves are summed and divided by the total amplitude so the output stays
/// in `[-1, 1]`; the result is clamped to absorb rounding at the extremes.
pub struct FractalField {
    perlin: Perlin,
    params: FractalParams,
    amplitude_sum: f64,
}

impl FractalField {
    pub fn new(params: FractalParams) -> Result<Self, NoiseError> {
        params.validate()?;
        let mut amplitude_sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..params.octaves {
            amplitude_sum += amplitude;
            amplitude *= params.persistence;
        }
        Ok(Self {
            perlin: Perlin::new(params.seed),
            params,
            amplitude_sum,
        })
    }

    pub fn params(&self) -> &FractalParams {
        &self.params
    }
}

impl NoiseField for FractalField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.scale;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            total += self.perlin.get([x * frequency, y * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        (total / self.amplitude_sum).clamp(-1.0, 1.0)
    }
}

/// Separable wave field `sin(x * f) * cos(y * f)`.
///
/// Cheap enough to evaluate on an accelerator; the GPU sampler computes the
/// same expression in single precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveField {
    pub frequency: f64,
}

impl WaveField {
    pub fn new(frequency: f64) -> Self {
        Self { frequency }
    }

    /// The frequency must be finite and positive.
    pub fn validate(&self) -> Result<(), NoiseError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(NoiseError::InvalidParams(format!(
                "frequency must be finite and positive, got {}",
                self.frequency
            )));
        }
        Ok(())
    }
}

impl Default for WaveField {
    fn default() -> Self {
        Self { frequency: 1.0 }
    }
}

impl NoiseField for WaveField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        (x * self.frequency).sin() * (y * self.frequency).cos()
    }
}
