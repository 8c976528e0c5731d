use glam::DVec2;

use crate::{NoiseError, NoiseField};

/// Evaluates a noise field for many points in one call.
///
/// The call is synchronous: it returns only once every point has been
/// computed, so callers never observe a partially filled batch. The returned
/// vector has exactly one value per input point, in input order.
pub trait BatchSampler {
    fn sample_points(&mut self, points: &[DVec2]) -> Result<Vec<f64>, NoiseError>;

    /// Short human-readable backend name for logs and overlays.
    fn backend(&self) -> &str {
        "cpu"
    }
}

impl<S: BatchSampler + ?Sized> BatchSampler for Box<S> {
    fn sample_points(&mut self, points: &[DVec2]) -> Result<Vec<f64>, NoiseError> {
        (**self).sample_points(points)
    }

    fn backend(&self) -> &str {
        (**self).backend()
    }
}

/// Batch sampler that evaluates a [`NoiseField`] point by point on the CPU.
pub struct CpuSampler<F> {
    field: F,
}

impl<F: NoiseField> CpuSampler<F> {
    pub fn new(field: F) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &F {
        &self.field
    }
}

impl<F: NoiseField> BatchSampler for CpuSampler<F> {
    fn sample_points(&mut self, points: &[DVec2]) -> Result<Vec<f64>, NoiseError> {
        Ok(points.iter().map(|p| self.field.sample(p.x, p.y)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WaveField;

    #[test]
    fn cpu_sampler_preserves_order() {
        let mut sampler = CpuSampler::new(WaveField::new(1.0));
        let points = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)];
        let values = sampler.sample_points(&points).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 1.0f64.sin());
        assert_eq!(values[2], 1.0f64.sin() * 1.0f64.cos());
    }

    #[test]
    fn empty_batch_is_empty() {
        let mut sampler = CpuSampler::new(WaveField::default());
        assert!(sampler.sample_points(&[]).unwrap().is_empty());
    }

    #[test]
    fn boxed_sampler_reports_backend() {
        let sampler: Box<dyn BatchSampler> = Box::new(CpuSampler::new(WaveField::default()));
        assert_eq!(sampler.backend(), "cpu");
    }
}
