//! # Dense Volume Packing
//!
//! Two byte volumes, both laid out `x + y * W + z * W * H`:
//!
//! - `occupancy`: 1 where a voxel exists, 0 elsewhere
//! - `color_ids`: palette index, meaningful only where occupied
//!
//! These are uploaded verbatim as `R8Uint` 3D textures.

use bitfields_shared::{GridDimensions, MAX_PALETTE};

use crate::field::{Voxel, VoxelField};

/// Highest color id the GPU palette can address.
#[allow(clippy::cast_possible_truncation)]
const MAX_COLOR_ID: u8 = (MAX_PALETTE - 1) as u8;

/// Occupancy and color-id volumes for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeTextures {
    dims: GridDimensions,
    occupancy: Vec<u8>,
    color_ids: Vec<u8>,
}

impl VolumeTextures {
    /// Grid the volumes cover.
    #[must_use]
    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Raw occupancy bytes.
    #[must_use]
    pub fn occupancy(&self) -> &[u8] {
        &self.occupancy
    }

    /// Raw color-id bytes.
    #[must_use]
    pub fn color_ids(&self) -> &[u8] {
        &self.color_ids
    }

    /// Occupancy at a signed coordinate; 0 outside the grid.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn occupancy_at(&self, x: i64, y: i64, z: i64) -> u8 {
        if self.dims.contains(x, y, z) {
            self.occupancy[self.dims.index(x as u32, y as u32, z as u32)]
        } else {
            0
        }
    }

    /// Returns true if the signed coordinate is inside and occupied.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, x: i64, y: i64, z: i64) -> bool {
        self.occupancy_at(x, y, z) != 0
    }

    /// Color id at a signed coordinate; 0 outside the grid.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn color_id_at(&self, x: i64, y: i64, z: i64) -> u8 {
        if self.dims.contains(x, y, z) {
            self.color_ids[self.dims.index(x as u32, y as u32, z as u32)]
        } else {
            0
        }
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|&&o| o != 0).count()
    }

    /// True when all six axis neighbors are occupied.
    #[must_use]
    pub fn is_buried(&self, x: i64, y: i64, z: i64) -> bool {
        self.is_occupied(x - 1, y, z)
            && self.is_occupied(x + 1, y, z)
            && self.is_occupied(x, y - 1, z)
            && self.is_occupied(x, y + 1, z)
            && self.is_occupied(x, y, z - 1)
            && self.is_occupied(x, y, z + 1)
    }
}

/// Flattens sparse voxels into dense volumes.
pub struct VolumeTexturePacker;

impl VolumeTexturePacker {
    /// Packs a built field.
    #[must_use]
    pub fn pack(field: &VoxelField) -> VolumeTextures {
        Self::pack_voxels(field.voxels(), field.dims(), field.palette().len())
    }

    /// Packs an arbitrary voxel list.
    ///
    /// Color ids are the voxels' palette positions. Palettes longer than
    /// [`MAX_PALETTE`] cannot be addressed past the last slot; those ids are
    /// pinned to `MAX_PALETTE - 1`. Voxels outside `dims` are skipped.
    #[must_use]
    pub fn pack_voxels(voxels: &[Voxel], dims: GridDimensions, palette_len: usize) -> VolumeTextures {
        let cells = dims.x as usize * dims.y as usize * dims.z as usize;
        let mut occupancy = vec![0u8; cells];
        let mut color_ids = vec![0u8; cells];

        if palette_len > MAX_PALETTE {
            tracing::warn!(
                palette_len,
                max = MAX_PALETTE,
                "palette exceeds GPU slots; trailing colors are unreachable"
            );
        }

        let mut skipped = 0usize;
        for voxel in voxels {
            if voxel.x >= dims.x || voxel.y >= dims.y || voxel.z >= dims.z {
                skipped += 1;
                continue;
            }
            let idx = dims.index(voxel.x, voxel.y, voxel.z);
            occupancy[idx] = 1;
            color_ids[idx] = voxel.palette_index.min(MAX_COLOR_ID);
        }

        if skipped > 0 {
            tracing::warn!(skipped, dims = %dims, "voxels outside the grid were not packed");
        }

        VolumeTextures {
            dims,
            occupancy,
            color_ids,
        }
    }
}
