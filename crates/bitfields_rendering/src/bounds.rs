//! World-space placement of the grid.
//!
//! The grid is centered on the origin: `min = -dims / 2 * cell_size`,
//! `max = min + dims * cell_size`. Voxel `(x, y, z)` occupies
//! `[min + (x, y, z) * cell_size, min + (x + 1, y + 1, z + 1) * cell_size]`.

use bitfields_shared::GridDimensions;
use glam::{IVec3, Vec3};

/// Axis-aligned box enclosing the whole grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeBounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
    /// Edge length of one voxel.
    pub cell_size: f32,
}

impl VolumeBounds {
    /// Bounds for a grid centered on the origin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centered(dims: GridDimensions, cell_size: f32) -> Self {
        let extent = Vec3::new(dims.x as f32, dims.y as f32, dims.z as f32) * cell_size;
        let min = -extent * 0.5;
        Self {
            min,
            max: min + extent,
            cell_size,
        }
    }

    /// World-space center of a voxel.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn voxel_center(&self, x: u32, y: u32, z: u32) -> Vec3 {
        self.min + (Vec3::new(x as f32, y as f32, z as f32) + 0.5) * self.cell_size
    }

    /// Cell containing a world point (may lie outside the grid).
    #[inline]
    #[must_use]
    pub fn cell_at(&self, p: Vec3) -> IVec3 {
        ((p - self.min) / self.cell_size).floor().as_ivec3()
    }

    /// Box center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Box diagonal length.
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }
}
