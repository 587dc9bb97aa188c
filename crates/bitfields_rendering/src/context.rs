//! Device, queue and target formats shared by both renderers.

use std::sync::Arc;

use glam::Mat4;

use crate::error::{RenderError, RenderResult};
use crate::strategy::BackendCapabilities;

/// Formats of the pass the renderers draw into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargets {
    /// Color attachment format.
    pub color_format: wgpu::TextureFormat,
    /// Depth attachment format, if the pass has one.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl Default for RenderTargets {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
        }
    }
}

/// GPU handles owned by the host.
#[derive(Debug, Clone)]
pub struct GpuContext {
    /// Logical device.
    pub device: Arc<wgpu::Device>,
    /// Submission queue.
    pub queue: Arc<wgpu::Queue>,
    /// Pass formats.
    pub targets: RenderTargets,
    /// What the backend can do.
    pub capabilities: BackendCapabilities,
}

impl GpuContext {
    /// Wraps handles the host already created.
    #[must_use]
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        targets: RenderTargets,
        capabilities: BackendCapabilities,
    ) -> Self {
        Self {
            device,
            queue,
            targets,
            capabilities,
        }
    }

    /// Opens a headless device on the best available adapter.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoAdapter`] if no adapter is found, or
    /// [`RenderError::RequestDevice`] if device creation fails.
    pub async fn request(targets: RenderTargets) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        let capabilities = BackendCapabilities::from_adapter(&adapter);
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            integer_volume_sampling = capabilities.integer_volume_sampling,
            max_texture_dimension_3d = capabilities.max_texture_dimension_3d,
            "GPU adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Bitfields Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                },
                None,
            )
            .await?;

        Ok(Self::new(Arc::new(device), Arc::new(queue), targets, capabilities))
    }
}

/// Shadow map produced by the host's light pass.
#[derive(Debug)]
pub struct ShadowResources {
    /// `Depth32Float` 2D view of the light's depth buffer.
    pub depth_view: wgpu::TextureView,
    /// World-to-light-clip transform the map was rendered with.
    pub light_matrix: Mat4,
}
