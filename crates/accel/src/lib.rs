//! Accelerator support: a one-time capability probe and a GPU batch sampler.
//!
//! # Invariants
//! - The platform is probed once; callers pass the [`AcceleratorStatus`] down.
//! - A batch call returns only after every result is back in host memory.

mod probe;
mod shaders;
mod wave;

use tilescape_noise::NoiseError;

pub use probe::{Accelerator, AcceleratorStatus, probe};
pub use wave::GpuWaveSampler;

#[derive(Debug, thiserror::Error)]
pub enum AccelError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),
    #[error("GPU readback was dropped before completion")]
    ReadbackLost,
    #[error("batch of {points} points exceeds the device limit of {limit}")]
    BatchTooLarge { points: usize, limit: usize },
}

impl From<AccelError> for NoiseError {
    fn from(err: AccelError) -> Self {
        NoiseError::Backend(err.to_string())
    }
}

pub fn crate_info() -> &'static str {
    "tilescape-accel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("accel"));
    }

    #[test]
    fn errors_become_backend_noise_errors() {
        let err: NoiseError = AccelError::BatchTooLarge { points: 10, limit: 4 }.into();
        assert!(matches!(err, NoiseError::Backend(msg) if msg.contains("10")));
    }
}
