//! Grid extents and flat indexing.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Extent of the voxel grid along each axis.
///
/// Flat indices follow `x + y * W + z * W * H`, the layout shared by the
/// occupancy volume, the color-id volume and the GPU 3D textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    /// Cells along x (texture width).
    pub x: u32,
    /// Cells along y (texture height).
    pub y: u32,
    /// Cells along z (texture depth).
    pub z: u32,
}

impl GridDimensions {
    /// Creates grid dimensions. Use [`Self::validate`] before building.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Checks that every axis is positive and the grid fits in memory indices.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGrid`] for a zero axis and
    /// [`ConfigError::GridTooLarge`] when the cell count overflows `usize`.
    pub fn validate(self) -> ConfigResult<Self> {
        if self.x == 0 || self.y == 0 || self.z == 0 {
            return Err(ConfigError::InvalidGrid {
                x: self.x,
                y: self.y,
                z: self.z,
            });
        }
        let cells = self.cell_count();
        if usize::try_from(cells).is_err() {
            return Err(ConfigError::GridTooLarge { cells });
        }
        Ok(self)
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub const fn cell_count(self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// Flat index of an in-bounds cell.
    #[inline]
    #[must_use]
    pub const fn index(self, x: u32, y: u32, z: u32) -> usize {
        let w = self.x as usize;
        let h = self.y as usize;
        x as usize + y as usize * w + z as usize * w * h
    }

    /// Returns true when the signed coordinate lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && x < self.x as i64
            && y < self.y as i64
            && z < self.z as i64
    }

    /// Longest axis. 3D texture limits are checked against this.
    #[inline]
    #[must_use]
    pub fn max_axis(self) -> u32 {
        self.x.max(self.y).max(self.z)
    }

    /// Geometric center in cell units (`dims / 2`, may be fractional).
    #[inline]
    #[must_use]
    pub fn center(self) -> [f64; 3] {
        [
            f64::from(self.x) / 2.0,
            f64::from(self.y) / 2.0,
            f64::from(self.z) / 2.0,
        ]
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        crate::constants::DEFAULT_GRID
    }
}

impl std::fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_index_layout() {
        let dims = GridDimensions::new(4, 3, 2);
        assert_eq!(dims.index(0, 0, 0), 0);
        assert_eq!(dims.index(1, 0, 0), 1);
        assert_eq!(dims.index(0, 1, 0), 4);
        assert_eq!(dims.index(0, 0, 1), 12);
        assert_eq!(dims.index(3, 2, 1), 23, "Last cell must be N - 1");
        assert_eq!(dims.cell_count(), 24);
    }

    #[test]
    fn test_zero_axis_rejected() {
        assert!(matches!(
            GridDimensions::new(4, 0, 4).validate(),
            Err(ConfigError::InvalidGrid { y: 0, .. })
        ));
        assert!(GridDimensions::new(1, 1, 1).validate().is_ok());
    }

    #[test]
    fn test_contains_signed() {
        let dims = GridDimensions::new(2, 2, 2);
        assert!(dims.contains(0, 1, 1));
        assert!(!dims.contains(-1, 0, 0));
        assert!(!dims.contains(0, 2, 0));
    }

    #[test]
    fn test_display_matches_export_naming() {
        assert_eq!(GridDimensions::new(128, 256, 128).to_string(), "128x256x128");
    }
}
