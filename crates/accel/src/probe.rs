use crate::{AccelError, GpuWaveSampler};

/// An opened GPU device suitable for compute work.
pub struct Accelerator {
    info: wgpu::AdapterInfo,
    limits: wgpu::Limits,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

/// Result of the startup capability probe.
///
/// Evaluated once and passed to whatever needs it; nothing else queries the
/// platform for accelerator support.
pub enum AcceleratorStatus {
    Available(Accelerator),
    Unavailable { reason: String },
}

impl AcceleratorStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, AcceleratorStatus::Available(_))
    }

    /// One-line summary for logs and overlays.
    pub fn describe(&self) -> String {
        match self {
            AcceleratorStatus::Available(acc) => {
                format!("{} ({:?}, {:?})", acc.info.name, acc.info.backend, acc.info.device_type)
            }
            AcceleratorStatus::Unavailable { reason } => format!("unavailable: {reason}"),
        }
    }

    pub fn into_accelerator(self) -> Option<Accelerator> {
        match self {
            AcceleratorStatus::Available(acc) => Some(acc),
            AcceleratorStatus::Unavailable { .. } => None,
        }
    }
}

impl std::fmt::Debug for AcceleratorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Look for a GPU adapter and open a device on it.
pub fn probe() -> AcceleratorStatus {
    match request() {
        Ok(acc) => {
            tracing::info!(
                adapter = %acc.info.name,
                backend = ?acc.info.backend,
                "accelerator available"
            );
            AcceleratorStatus::Available(acc)
        }
        Err(err) => {
            tracing::warn!(error = %err, "no accelerator, using CPU sampling");
            AcceleratorStatus::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}

fn request() -> Result<Accelerator, AccelError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or(AccelError::NoAdapter)?;

    let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("tilescape_compute_device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
        },
        None,
    ))?;

    Ok(Accelerator {
        info: adapter.get_info(),
        limits,
        device,
        queue,
    })
}

impl Accelerator {
    pub fn info(&self) -> &wgpu::AdapterInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Largest batch a single dispatch can cover.
    pub fn max_batch(&self) -> usize {
        let by_dispatch = self.limits.max_compute_workgroups_per_dimension as usize
            * crate::shaders::WORKGROUP_SIZE as usize;
        // Points are vec2<f32>, the larger of the two storage buffers.
        let by_binding = self.limits.max_storage_buffer_binding_size as usize / 8;
        by_dispatch.min(by_binding)
    }

    /// Hand the device to a wave-field batch sampler.
    pub fn into_wave_sampler(self, frequency: f64) -> GpuWaveSampler {
        let max_batch = self.max_batch();
        GpuWaveSampler::new(self.device, self.queue, &self.info, frequency, max_batch)
    }
}
