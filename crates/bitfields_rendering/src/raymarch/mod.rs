//! # Volumetric Ray Marching
//!
//! Per pixel:
//!
//! 1. Unproject the pixel through `inv_projection` and `camera_world`
//! 2. Clip the ray against the volume box (slab method), discard on miss
//! 3. Step from `max(t_near, 0)` by `step_size`, at most `max_steps` times
//! 4. On the first occupied cell: 6-tap occupancy gradient normal, Lambert,
//!    palette color, optional shadow-map visibility, gamma `1/2.2`
//! 5. Discard when the budget or the box is exhausted
//!
//! [`RayMarchUniforms`] is shared verbatim by the WGSL shader and
//! [`CpuRayMarcher`], so both paths read identical parameters.

mod cpu;
mod gpu;
mod shader;

pub use cpu::{CpuRayMarcher, MarchOutcome, Ray, ShadowMap};
pub use gpu::RayMarchRenderer;
pub use shader::{shader_source, RAY_MARCH_WGSL};

use bitfields_shared::{GridDimensions, Palette, RayMarchSettings, MAX_PALETTE};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::bounds::VolumeBounds;
use crate::camera::CameraState;

/// NDC depth the primary ray is unprojected at. Any depth strictly inside
/// the frustum yields the same direction; 0.5 stays finite for infinite
/// far planes.
pub const NDC_RAY_DEPTH: f32 = 0.5;

/// Uniform block for the ray-march pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RayMarchUniforms {
    /// Clip-to-view transform.
    pub inv_projection: [[f32; 4]; 4],
    /// Camera-to-world transform.
    pub camera_world: [[f32; 4]; 4],
    /// World-to-light-clip transform for the shadow lookup.
    pub light_matrix: [[f32; 4]; 4],
    /// Ray origin (xyz), w unused.
    pub camera_position: [f32; 4],
    /// Volume minimum corner (xyz) + cell size (w).
    pub volume_min: [f32; 4],
    /// Volume maximum corner (xyz) + step size (w).
    pub volume_max: [f32; 4],
    /// Grid dimensions (xyz) + max steps (w).
    pub volume_dims: [u32; 4],
    /// Normalized light travel direction (xyz) + shadow bias (w).
    pub light_dir: [f32; 4],
    /// Ambient, diffuse, shadowed visibility, shadows enabled (0 or 1).
    pub shading: [f32; 4],
    /// Width, height, 1/width, 1/height.
    pub resolution: [f32; 4],
}

impl RayMarchUniforms {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Uniforms for a volume with an identity camera and 1x1 target.
    #[must_use]
    pub fn new(bounds: &VolumeBounds, dims: GridDimensions, settings: &RayMarchSettings) -> Self {
        let light = Vec3::from(settings.light_dir).normalize_or_zero();
        let mut uniforms = Self {
            inv_projection: Mat4::IDENTITY.to_cols_array_2d(),
            camera_world: Mat4::IDENTITY.to_cols_array_2d(),
            light_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0; 4],
            volume_min: bounds.min.extend(bounds.cell_size).to_array(),
            volume_max: bounds.max.extend(settings.step_size).to_array(),
            volume_dims: [dims.x, dims.y, dims.z, settings.max_steps],
            light_dir: light.extend(settings.shadow_bias).to_array(),
            shading: [
                settings.ambient,
                settings.diffuse,
                settings.shadow_visibility,
                0.0,
            ],
            resolution: [0.0; 4],
        };
        uniforms.set_resolution(1, 1);
        uniforms
    }

    /// Writes camera matrices and position.
    pub fn set_camera(&mut self, camera: &CameraState) {
        self.inv_projection = camera.projection.inverse().to_cols_array_2d();
        self.camera_world = camera.world.to_cols_array_2d();
        self.camera_position = camera.position.extend(1.0).to_array();
    }

    /// Writes the render target size. Zero extents are clamped to 1.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        self.resolution = [w, h, w.recip(), h.recip()];
    }

    /// Enables the shadow lookup with `light_matrix`, or disables it.
    pub fn set_shadow(&mut self, light_matrix: Option<Mat4>) {
        match light_matrix {
            Some(matrix) => {
                self.light_matrix = matrix.to_cols_array_2d();
                self.shading[3] = 1.0;
            }
            None => {
                self.light_matrix = Mat4::IDENTITY.to_cols_array_2d();
                self.shading[3] = 0.0;
            }
        }
    }

    /// Returns true when the shadow lookup is enabled.
    #[must_use]
    pub fn shadows_enabled(&self) -> bool {
        self.shading[3] > 0.5
    }
}

/// Palette uniform: `array<vec4<f32>, 64>`, linear RGB, unused slots black.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PaletteUniform {
    /// Colors by palette index.
    pub colors: [[f32; 4]; MAX_PALETTE],
}

impl PaletteUniform {
    /// Uploads the first [`MAX_PALETTE`] colors.
    #[must_use]
    pub fn from_palette(palette: &Palette) -> Self {
        let mut colors = [[0.0; 4]; MAX_PALETTE];
        for (slot, color) in colors.iter_mut().zip(&palette.colors) {
            let [r, g, b] = color.to_linear_f32();
            *slot = [r, g, b, 1.0];
        }
        Self { colors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        // 3 mat4 + 7 vec4
        assert_eq!(RayMarchUniforms::SIZE, 3 * 64 + 7 * 16);
        assert_eq!(RayMarchUniforms::SIZE % 16, 0);
        assert_eq!(std::mem::size_of::<PaletteUniform>(), 64 * 16);
    }

    #[test]
    fn test_settings_packed_into_w_lanes() {
        let dims = GridDimensions::new(8, 4, 2);
        let bounds = VolumeBounds::centered(dims, 0.5);
        let settings = RayMarchSettings::default();
        let u = RayMarchUniforms::new(&bounds, dims, &settings);

        assert_eq!(u.volume_min[3], 0.5);
        assert_eq!(u.volume_max[3], settings.step_size);
        assert_eq!(u.volume_dims, [8, 4, 2, settings.max_steps]);
        let light = Vec3::new(u.light_dir[0], u.light_dir[1], u.light_dir[2]);
        assert!((light.length() - 1.0).abs() < 1e-5);
        assert!(!u.shadows_enabled());
    }

    #[test]
    fn test_palette_uniform_zero_fills() {
        let palette = Palette::from_hex("p", &["#ffffff"]).unwrap();
        let uniform = PaletteUniform::from_palette(&palette);
        assert_eq!(uniform.colors[0], [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.colors[1], [0.0; 4]);
        assert_eq!(uniform.colors[63], [0.0; 4]);
    }
}
