//! CPU reference ray marcher.
//!
//! Walks the same steps as `fs_main` in the WGSL source, reading the same
//! [`RayMarchUniforms`], so headless hosts and tests see what the GPU draws.

use bitfields_procedural::VolumeTextures;
use bitfields_shared::Palette;
use glam::{IVec3, Mat4, Vec3};
use rayon::prelude::*;

use super::{PaletteUniform, RayMarchUniforms, NDC_RAY_DEPTH};

/// Highest palette slot the shader can index.
const MAX_COLOR_ID: usize = bitfields_shared::MAX_PALETTE - 1;

/// World-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub dir: Vec3,
}

impl Ray {
    /// Point at distance `t`.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Depth map rendered from the light, plus the transform that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowMap {
    width: u32,
    height: u32,
    depths: Vec<f32>,
    light_matrix: Mat4,
}

impl ShadowMap {
    /// Map cleared to the far plane (nothing shadowed).
    #[must_use]
    pub fn cleared(width: u32, height: u32, light_matrix: Mat4) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            depths: vec![1.0; width as usize * height as usize],
            light_matrix,
        }
    }

    /// Map width in texels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in texels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// World-to-light-clip transform.
    #[must_use]
    pub fn light_matrix(&self) -> Mat4 {
        self.light_matrix
    }

    /// Overwrites every texel.
    pub fn fill(&mut self, depth: f32) {
        self.depths.fill(depth);
    }

    /// Writes one texel; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, depth: f32) {
        if x < self.width && y < self.height {
            self.depths[(y * self.width + x) as usize] = depth;
        }
    }

    /// Depth at texture coordinate `uv` in `[0, 1)`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn depth_at_uv(&self, u: f32, v: f32) -> f32 {
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.depths[(y * self.width + x) as usize]
    }
}

/// Result of marching one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchOutcome {
    /// The ray never enters the volume box.
    Clipped,
    /// The ray left the box or ran out of steps.
    Miss {
        /// Samples taken.
        steps: u32,
    },
    /// First occupied cell along the ray.
    Hit {
        /// Grid coordinate of the cell.
        cell: IVec3,
        /// Ray distance of the sample.
        t: f32,
        /// Samples taken, including the hit.
        steps: u32,
    },
}

/// Ray marcher over packed volumes.
#[derive(Debug, Clone)]
pub struct CpuRayMarcher<'a> {
    volume: &'a VolumeTextures,
    palette: PaletteUniform,
    uniforms: RayMarchUniforms,
    shadow: Option<&'a ShadowMap>,
}

impl<'a> CpuRayMarcher<'a> {
    /// Marcher with shadows off.
    #[must_use]
    pub fn new(volume: &'a VolumeTextures, palette: &Palette, mut uniforms: RayMarchUniforms) -> Self {
        uniforms.set_shadow(None);
        Self {
            volume,
            palette: PaletteUniform::from_palette(palette),
            uniforms,
            shadow: None,
        }
    }

    /// Enables shadow lookups against `shadow`.
    #[must_use]
    pub fn with_shadow(mut self, shadow: &'a ShadowMap) -> Self {
        self.uniforms.set_shadow(Some(shadow.light_matrix));
        self.shadow = Some(shadow);
        self
    }

    /// Current uniforms.
    #[must_use]
    pub fn uniforms(&self) -> &RayMarchUniforms {
        &self.uniforms
    }

    /// Mutable uniforms (camera, resolution).
    pub fn uniforms_mut(&mut self) -> &mut RayMarchUniforms {
        &mut self.uniforms
    }

    /// Primary ray through a point in pixel space (top-left origin).
    #[must_use]
    pub fn primary_ray(&self, px: f32, py: f32) -> Ray {
        let u = &self.uniforms;
        let ndc_x = px * u.resolution[2] * 2.0 - 1.0;
        let ndc_y = 1.0 - py * u.resolution[3] * 2.0;

        let inv_projection = Mat4::from_cols_array_2d(&u.inv_projection);
        let view = inv_projection * glam::Vec4::new(ndc_x, ndc_y, NDC_RAY_DEPTH, 1.0);
        let view = view / view.w;
        let dir = Mat4::from_cols_array_2d(&u.camera_world)
            .transform_vector3(view.truncate())
            .normalize();

        Ray {
            origin: Vec3::new(u.camera_position[0], u.camera_position[1], u.camera_position[2]),
            dir,
        }
    }

    /// Slab test against the volume box. Returns `(t_near, t_far)` when the
    /// ray overlaps the box in front of its origin.
    #[must_use]
    pub fn clip(&self, ray: &Ray) -> Option<(f32, f32)> {
        let u = &self.uniforms;
        let min = Vec3::new(u.volume_min[0], u.volume_min[1], u.volume_min[2]);
        let max = Vec3::new(u.volume_max[0], u.volume_max[1], u.volume_max[2]);

        let inv = ray.dir.recip();
        let t0 = (min - ray.origin) * inv;
        let t1 = (max - ray.origin) * inv;
        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        (t_far >= t_near.max(0.0)).then_some((t_near, t_far))
    }

    /// Steps along `ray` until the first occupied cell, the far side of the
    /// box, or the step budget.
    #[must_use]
    pub fn march(&self, ray: &Ray) -> MarchOutcome {
        let Some((t_near, t_far)) = self.clip(ray) else {
            return MarchOutcome::Clipped;
        };
        let step_size = self.uniforms.volume_max[3];
        let max_steps = self.uniforms.volume_dims[3];

        let mut t = t_near.max(0.0);
        for step in 0..max_steps {
            if t > t_far {
                return MarchOutcome::Miss { steps: step };
            }
            let cell = self.cell_at(ray.at(t));
            if self.occupancy(cell) > 0.0 {
                return MarchOutcome::Hit {
                    cell,
                    t,
                    steps: step + 1,
                };
            }
            t += step_size;
        }
        MarchOutcome::Miss { steps: max_steps }
    }

    /// Gamma-encoded color of a hit.
    #[must_use]
    pub fn shade(&self, ray: &Ray, cell: IVec3, t: f32) -> Vec3 {
        let u = &self.uniforms;
        let gradient = Vec3::new(
            self.occupancy(cell + IVec3::X) - self.occupancy(cell - IVec3::X),
            self.occupancy(cell + IVec3::Y) - self.occupancy(cell - IVec3::Y),
            self.occupancy(cell + IVec3::Z) - self.occupancy(cell - IVec3::Z),
        );
        let n = if gradient.length_squared() > 0.0 {
            gradient.normalize()
        } else {
            ray.dir
        };
        let light = Vec3::new(u.light_dir[0], u.light_dir[1], u.light_dir[2]);
        let diff = n.dot(light).max(0.0);

        let id = usize::from(self.volume.color_id_at(
            i64::from(cell.x),
            i64::from(cell.y),
            i64::from(cell.z),
        ))
        .min(MAX_COLOR_ID);
        let [r, g, b, _] = self.palette.colors[id];
        let base = Vec3::new(r, g, b);

        let color = base * (u.shading[0] + u.shading[1] * diff) * self.shadow_visibility(ray.at(t));
        color.powf(1.0 / 2.2)
    }

    /// Marches and shades one ray. `None` where the shader discards.
    #[must_use]
    pub fn trace(&self, ray: &Ray) -> Option<Vec3> {
        match self.march(ray) {
            MarchOutcome::Hit { cell, t, .. } => Some(self.shade(ray, cell, t)),
            MarchOutcome::Clipped | MarchOutcome::Miss { .. } => None,
        }
    }

    /// RGBA8 color of pixel `(x, y)`, sampled at its center.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn trace_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let ray = self.primary_ray(x as f32 + 0.5, y as f32 + 0.5);
        self.trace(&ray).map(|c| {
            let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let px = [c.x as u8, c.y as u8, c.z as u8, 255];
            px
        })
    }

    /// Renders a full frame, rows in parallel. Discarded pixels are
    /// transparent black.
    #[must_use]
    pub fn render(&mut self, width: u32, height: u32) -> Vec<[u8; 4]> {
        self.uniforms.set_resolution(width, height);
        let this = &*self;
        (0..height)
            .into_par_iter()
            .flat_map_iter(|y| (0..width).map(move |x| this.trace_pixel(x, y).unwrap_or([0; 4])))
            .collect()
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn cell_at(&self, p: Vec3) -> IVec3 {
        let u = &self.uniforms;
        let min = Vec3::new(u.volume_min[0], u.volume_min[1], u.volume_min[2]);
        ((p - min) / u.volume_min[3]).floor().as_ivec3()
    }

    #[inline]
    fn occupancy(&self, cell: IVec3) -> f32 {
        f32::from(self.volume.occupancy_at(
            i64::from(cell.x),
            i64::from(cell.y),
            i64::from(cell.z),
        ))
    }

    fn shadow_visibility(&self, p: Vec3) -> f32 {
        let Some(shadow) = self.shadow.filter(|_| self.uniforms.shadows_enabled()) else {
            return 1.0;
        };
        let clip = Mat4::from_cols_array_2d(&self.uniforms.light_matrix) * p.extend(1.0);
        if clip.w <= 0.0 {
            return 1.0;
        }
        let ndc = clip.truncate() / clip.w;
        let (u, v) = (ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) || ndc.z > 1.0 {
            return 1.0;
        }
        if ndc.z - self.uniforms.light_dir[3] > shadow.depth_at_uv(u, v) {
            self.uniforms.shading[2]
        } else {
            1.0
        }
    }
}
