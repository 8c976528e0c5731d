use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use tilescape_noise::{BatchSampler, NoiseError};

use crate::AccelError;
use crate::shaders::{WAVE_SHADER, WORKGROUP_SIZE};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Params {
    frequency: f32,
    count: u32,
    _pad: [u32; 2],
}

/// Device buffers sized for `capacity` points.
struct Buffers {
    capacity: usize,
    points: wgpu::Buffer,
    values: wgpu::Buffer,
    staging: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

const MIN_CAPACITY: usize = 1024;

/// Batch sampler evaluating the wave field in a wgpu compute shader.
///
/// The sampler exclusively owns its device buffers. They grow to the largest
/// batch seen and are overwritten by every call; each call blocks until the
/// results are copied back to host memory. Coordinates and results pass
/// through the device as `f32`.
pub struct GpuWaveSampler {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    params: wgpu::Buffer,
    buffers: Option<Buffers>,
    frequency: f64,
    max_batch: usize,
    label: String,
}

impl GpuWaveSampler {
    pub(crate) fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        info: &wgpu::AdapterInfo,
        frequency: f64,
        max_batch: usize,
    ) -> Self {
        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("wave_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage(1, true),
                storage(2, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("wave_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wave_shader"),
            source: wgpu::ShaderSource::Wgsl(WAVE_SHADER.into()),
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("wave_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_params"),
            size: std::mem::size_of::<Params>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            device,
            queue,
            pipeline,
            layout,
            params,
            buffers: None,
            frequency,
            max_batch,
            label: format!("gpu ({})", info.name),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Points the device buffers currently hold room for.
    pub fn capacity(&self) -> usize {
        self.buffers.as_ref().map_or(0, |b| b.capacity)
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    fn ensure_capacity(&mut self, count: usize) {
        if self.buffers.as_ref().is_some_and(|b| b.capacity >= count) {
            return;
        }
        let capacity = count.next_power_of_two().clamp(MIN_CAPACITY, self.max_batch.max(count));
        tracing::debug!(capacity, "growing wave sampler buffers");

        let points = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_points"),
            size: (capacity * std::mem::size_of::<[f32; 2]>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let values_size = (capacity * std::mem::size_of::<f32>()) as u64;
        let values = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_values"),
            size: values_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_staging"),
            size: values_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wave_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: points.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: values.as_entire_binding(),
                },
            ],
        });

        self.buffers = Some(Buffers {
            capacity,
            points,
            values,
            staging,
            bind_group,
        });
    }

    fn dispatch(&mut self, points: &[DVec2]) -> Result<Vec<f64>, AccelError> {
        let count = points.len();
        if count > self.max_batch {
            return Err(AccelError::BatchTooLarge {
                points: count,
                limit: self.max_batch,
            });
        }
        self.ensure_capacity(count);
        let Some(buffers) = self.buffers.as_ref() else {
            return Err(AccelError::ReadbackLost);
        };

        let input: Vec<[f32; 2]> = points.iter().map(|p| [p.x as f32, p.y as f32]).collect();
        self.queue.write_buffer(
            &self.params,
            0,
            bytemuck::bytes_of(&Params {
                frequency: self.frequency as f32,
                count: count as u32,
                _pad: [0; 2],
            }),
        );
        self.queue.write_buffer(&buffers.points, 0, bytemuck::cast_slice(&input));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("wave_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("wave_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &buffers.bind_group, &[]);
            pass.dispatch_workgroups((count as u32).div_ceil(WORKGROUP_SIZE), 1, 1);
        }
        let bytes = (count * std::mem::size_of::<f32>()) as u64;
        encoder.copy_buffer_to_buffer(&buffers.values, 0, &buffers.staging, 0, bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffers.staging.slice(..bytes);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv().map_err(|_| AccelError::ReadbackLost)??;

        let values = {
            let mapped = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&mapped)
                .iter()
                .map(|&v| v as f64)
                .collect()
        };
        buffers.staging.unmap();
        Ok(values)
    }
}

impl BatchSampler for GpuWaveSampler {
    fn sample_points(&mut self, points: &[DVec2]) -> Result<Vec<f64>, NoiseError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let _span = tracing::debug_span!("gpu_sample", points = points.len()).entered();
        Ok(self.dispatch(points)?)
    }

    fn backend(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AcceleratorStatus, probe};
    use tilescape_noise::{NoiseField, WaveField};

    fn sampler(frequency: f64) -> Option<GpuWaveSampler> {
        match probe() {
            AcceleratorStatus::Available(acc) => Some(acc.into_wave_sampler(frequency)),
            AcceleratorStatus::Unavailable { reason } => {
                eprintln!("skipping GPU test: {reason}");
                None
            }
        }
    }

    #[test]
    fn matches_cpu_wave_field() {
        let Some(mut gpu) = sampler(1.0) else { return };
        let cpu = WaveField::new(1.0);
        let points: Vec<DVec2> = (-20..20)
            .flat_map(|y| (-20..20).map(move |x| DVec2::new(x as f64 * 0.25, y as f64 * 0.25)))
            .collect();

        let values = gpu.sample_points(&points).unwrap();
        assert_eq!(values.len(), points.len());
        for (p, v) in points.iter().zip(&values) {
            let expected = cpu.sample(p.x, p.y);
            assert!((v - expected).abs() < 1e-3, "{p:?}: gpu {v} cpu {expected}");
        }
    }

    #[test]
    fn buffers_grow_and_are_reused() {
        let Some(mut gpu) = sampler(2.0) else { return };
        assert_eq!(gpu.capacity(), 0);

        gpu.sample_points(&[DVec2::ZERO; 10]).unwrap();
        assert_eq!(gpu.capacity(), MIN_CAPACITY);

        let big = vec![DVec2::new(0.5, 0.5); 3000];
        let values = gpu.sample_points(&big).unwrap();
        assert_eq!(gpu.capacity(), 4096);
        assert_eq!(values.len(), 3000);

        // A smaller batch after a larger one only sees its own results.
        let values = gpu.sample_points(&[DVec2::ZERO; 3]).unwrap();
        assert_eq!(values, vec![0.0; 3]);
        assert_eq!(gpu.capacity(), 4096);
    }

    #[test]
    fn empty_batch_skips_the_device() {
        let Some(mut gpu) = sampler(1.0) else { return };
        assert!(gpu.sample_points(&[]).unwrap().is_empty());
        assert_eq!(gpu.capacity(), 0);
    }

    #[test]
    fn backend_names_the_adapter() {
        let Some(gpu) = sampler(1.0) else { return };
        assert!(gpu.backend().starts_with("gpu"));
    }
}
