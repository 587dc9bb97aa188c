//! # Renderer Strategy
//!
//! Picks the ray marcher or the instanced fallback once per build. Frames
//! never re-decide: the chosen [`VoxelRenderer`] lives as long as the build.

use bitfields_procedural::{VolumeTextures, VoxelField};
use bitfields_shared::{GridDimensions, RayMarchSettings, RendererPreference};

use crate::bounds::VolumeBounds;
use crate::camera::CameraState;
use crate::context::{GpuContext, ShadowResources};
use crate::error::RenderResult;
use crate::instancing::{InstanceBuilder, InstancedRenderer};
use crate::raymarch::RayMarchRenderer;

/// Which renderer a build uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Full-screen volumetric ray march.
    RayMarch,
    /// Instanced cubes.
    Instanced,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::RayMarch => "ray_march",
            Self::Instanced => "instanced",
        })
    }
}

/// Backend features relevant to renderer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Largest 3D texture edge.
    pub max_texture_dimension_3d: u32,
    /// Whether fragment shaders can `textureLoad` from `texture_3d<u32>`.
    pub integer_volume_sampling: bool,
    /// Largest buffer the device accepts.
    pub max_buffer_size: u64,
}

impl BackendCapabilities {
    /// Capabilities with explicit values, for hosts without an adapter.
    #[must_use]
    pub const fn headless(
        max_texture_dimension_3d: u32,
        integer_volume_sampling: bool,
        max_buffer_size: u64,
    ) -> Self {
        Self {
            max_texture_dimension_3d,
            integer_volume_sampling,
            max_buffer_size,
        }
    }

    /// Reads limits and the shader model from an adapter.
    #[must_use]
    pub fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let limits = adapter.limits();
        let downlevel = adapter.get_downlevel_capabilities();
        Self {
            max_texture_dimension_3d: limits.max_texture_dimension_3d,
            integer_volume_sampling: downlevel.shader_model != wgpu::ShaderModel::Sm2,
            max_buffer_size: limits.max_buffer_size,
        }
    }
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        let limits = wgpu::Limits::default();
        Self::headless(limits.max_texture_dimension_3d, true, limits.max_buffer_size)
    }
}

/// Chooses a renderer. Ray marching is kept only when the backend can load
/// integer 3D textures large enough for the grid.
#[must_use]
pub fn select_renderer(
    preference: RendererPreference,
    capabilities: &BackendCapabilities,
    dims: GridDimensions,
) -> RendererKind {
    match preference {
        RendererPreference::Instanced => RendererKind::Instanced,
        RendererPreference::RayMarch => {
            if !capabilities.integer_volume_sampling {
                tracing::warn!("backend cannot sample integer 3D textures, using instanced fallback");
                RendererKind::Instanced
            } else if dims.max_axis() > capabilities.max_texture_dimension_3d {
                tracing::warn!(
                    dims = %dims,
                    limit = capabilities.max_texture_dimension_3d,
                    "grid exceeds 3D texture limit, using instanced fallback"
                );
                RendererKind::Instanced
            } else {
                RendererKind::RayMarch
            }
        }
    }
}

/// Counters for one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Renderer in use.
    pub kind: RendererKind,
    /// Draw calls per frame.
    pub draw_calls: u32,
    /// Instances per frame (0 on the ray-march path).
    pub instances: u32,
    /// Voxels skipped as buried (instanced path).
    pub culled: u32,
    /// Occupied voxels in the build.
    pub voxels: u32,
    /// Bytes uploaded for the volume or instances.
    pub gpu_bytes: u64,
    /// Frames drawn so far.
    pub frames: u64,
}

/// One renderer implementation.
///
/// Methods take `&self` so a frame can draw from a shared snapshot while
/// the host pushes camera and size updates.
pub trait VoxelRenderer: Send + Sync {
    /// Which implementation this is.
    fn kind(&self) -> RendererKind;

    /// Uploads new camera matrices.
    fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraState);

    /// Records a new target size.
    fn resize(&self, queue: &wgpu::Queue, width: u32, height: u32);

    /// Records the draw into an open pass.
    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>);

    /// Current counters.
    fn stats(&self) -> RenderStats;
}

/// Everything a renderer needs from one build.
#[derive(Debug, Clone, Copy)]
pub struct RendererInputs<'a> {
    /// Sparse voxels (instanced path).
    pub field: &'a VoxelField,
    /// Packed volumes.
    pub volume: &'a VolumeTextures,
    /// World placement of the grid.
    pub bounds: VolumeBounds,
    /// Stepping and shading constants.
    pub settings: &'a RayMarchSettings,
    /// Optional light depth map for the ray marcher.
    pub shadow: Option<&'a ShadowResources>,
    /// Host preference.
    pub preference: RendererPreference,
    /// Skip fully enclosed voxels on the instanced path.
    pub cull_buried: bool,
}

/// Creates the renderer for a build.
///
/// A ray-march renderer that fails to initialize falls back to instancing.
///
/// # Errors
///
/// Returns an error only when the instanced fallback itself cannot be
/// created.
pub fn create_renderer(ctx: &GpuContext, inputs: &RendererInputs<'_>) -> RenderResult<Box<dyn VoxelRenderer>> {
    let kind = select_renderer(inputs.preference, &ctx.capabilities, inputs.volume.dims());

    if kind == RendererKind::RayMarch {
        match RayMarchRenderer::new(
            ctx,
            inputs.volume,
            inputs.field.palette(),
            &inputs.bounds,
            inputs.settings,
            inputs.shadow,
        ) {
            Ok(renderer) => return Ok(Box::new(renderer)),
            Err(err) => tracing::warn!(error = %err, "ray marcher unavailable, using instanced fallback"),
        }
    }

    let set = InstanceBuilder::new(inputs.bounds, inputs.cull_buried).build(inputs.field.voxels(), inputs.volume);
    Ok(Box::new(InstancedRenderer::new(ctx, &set, inputs.settings)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_march_kept_when_capable() {
        let caps = BackendCapabilities::headless(2048, true, 1 << 28);
        let kind = select_renderer(RendererPreference::RayMarch, &caps, GridDimensions::new(128, 256, 128));
        assert_eq!(kind, RendererKind::RayMarch);
    }

    #[test]
    fn test_falls_back_without_integer_sampling() {
        let caps = BackendCapabilities::headless(2048, false, 1 << 28);
        let kind = select_renderer(RendererPreference::RayMarch, &caps, GridDimensions::new(8, 8, 8));
        assert_eq!(kind, RendererKind::Instanced);
    }

    #[test]
    fn test_falls_back_when_grid_exceeds_limit() {
        let caps = BackendCapabilities::headless(256, true, 1 << 28);
        let kind = select_renderer(RendererPreference::RayMarch, &caps, GridDimensions::new(128, 512, 128));
        assert_eq!(kind, RendererKind::Instanced);
    }

    #[test]
    fn test_instanced_preference_always_honored() {
        let caps = BackendCapabilities::default();
        let kind = select_renderer(RendererPreference::Instanced, &caps, GridDimensions::new(8, 8, 8));
        assert_eq!(kind, RendererKind::Instanced);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RendererKind::RayMarch.to_string(), "ray_march");
        assert_eq!(RendererKind::Instanced.to_string(), "instanced");
    }
}
