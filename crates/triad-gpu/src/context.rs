//! wgpu device acquisition and the pipeline error taxonomy.

/// Fatal pipeline failures.
///
/// Neither variant is retried: a device that cannot be acquired or a
/// shader that does not compile leaves nothing to render with, so the
/// error propagates to the caller and rendering requires a fresh
/// [`BalancePipeline`](crate::BalancePipeline) on a working device.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No compatible adapter or device could be acquired.
    #[error("no compatible GPU device: {0}")]
    DeviceUnavailable(String),
    /// The balance shader failed to compile or link on this device.
    #[error("balance shader failed to compile: {0}")]
    ShaderCompileFailed(String),
}

/// Owns the wgpu device and queue the balance pipeline runs on.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire an adapter and device.
    pub fn new(low_power: bool) -> Result<Self, PipelineError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let power_preference = if low_power {
            wgpu::PowerPreference::LowPower
        } else {
            wgpu::PowerPreference::HighPerformance
        };

        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                ..Default::default()
            }))
            .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

        let info = adapter.get_info();
        tracing::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("triad_device"),
            ..Default::default()
        }))
        .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

        Ok(Self { device, queue })
    }
}
