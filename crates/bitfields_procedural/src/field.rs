//! # Voxel Field Construction
//!
//! Classifies every grid cell as void or colored. Cells are independent, so
//! the grid is split into x-slabs and evaluated on the rayon pool; the
//! ordered collect keeps the output in x-major, then y, then z order.

use std::time::Instant;

use bitfields_shared::{Color, GridDimensions, Palette};
use rayon::prelude::*;

use crate::error::{PatternError, PatternResult};
use crate::patterns::PatternFunction;

/// One non-void cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voxel {
    /// Grid x.
    pub x: u32,
    /// Grid y.
    pub y: u32,
    /// Grid z.
    pub z: u32,
    /// Clamped palette index, `state - transparent`.
    pub palette_index: u8,
    /// `palette[palette_index]`.
    pub color: Color,
}

/// Sparse result of one build.
#[derive(Debug, Clone)]
pub struct VoxelField {
    dims: GridDimensions,
    transparent: u32,
    total_states: u32,
    palette: Palette,
    voxels: Vec<Voxel>,
}

impl VoxelField {
    /// Grid the field was built on.
    #[must_use]
    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Number of void states.
    #[must_use]
    pub fn transparent(&self) -> u32 {
        self.transparent
    }

    /// Size of the pattern's state space.
    #[must_use]
    pub fn total_states(&self) -> u32 {
        self.total_states
    }

    /// Palette the field was colored with.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Non-void cells in grid iteration order.
    #[must_use]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Number of non-void cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns true if every cell is void.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

/// Evaluates a pattern over a grid.
#[derive(Debug, Clone, Copy)]
pub struct VoxelFieldBuilder {
    dims: GridDimensions,
    transparent: u32,
}

impl VoxelFieldBuilder {
    /// States below `transparent` are void.
    #[must_use]
    pub const fn new(dims: GridDimensions, transparent: u32) -> Self {
        Self { dims, transparent }
    }

    /// Classifies a single state. `None` means void.
    #[inline]
    #[must_use]
    pub fn classify(&self, state: u32, palette: &Palette) -> Option<(u8, Color)> {
        if state < self.transparent {
            return None;
        }
        let index = palette.clamp_index(i64::from(state - self.transparent));
        palette.get(index).map(|color| (index, color))
    }

    /// Visits every cell exactly once and keeps the colored ones.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::EmptyPalette`] if `palette` has no colors.
    pub fn build<P>(&self, pattern: &P, palette: &Palette) -> PatternResult<VoxelField>
    where
        P: PatternFunction + ?Sized,
    {
        if palette.is_empty() {
            return Err(PatternError::EmptyPalette);
        }

        let start = Instant::now();
        let GridDimensions { y: h, z: d, .. } = self.dims;

        let voxels: Vec<Voxel> = (0..self.dims.x)
            .into_par_iter()
            .flat_map_iter(|x| {
                (0..h).flat_map(move |y| {
                    (0..d).filter_map(move |z| {
                        self.classify(pattern.state(x, y, z), palette)
                            .map(|(palette_index, color)| Voxel {
                                x,
                                y,
                                z,
                                palette_index,
                                color,
                            })
                    })
                })
            })
            .collect();

        tracing::debug!(
            dims = %self.dims,
            voxels = voxels.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "voxel field built"
        );

        Ok(VoxelField {
            dims: self.dims,
            transparent: self.transparent,
            total_states: pattern.total_states(),
            palette: palette.clone(),
            voxels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::FnPattern;

    fn duo() -> Palette {
        Palette::from_hex("duo", &["#ff0000", "#00ff00"]).unwrap()
    }

    #[test]
    fn test_void_below_transparent() {
        let dims = GridDimensions::new(4, 4, 4);
        let pattern = FnPattern::new(4, |x, y, z| i64::from(x + y + z)).unwrap();
        let field = VoxelFieldBuilder::new(dims, 2).build(&pattern, &duo()).unwrap();

        let find = |x: u32, y: u32, z: u32| field.voxels().iter().find(|v| (v.x, v.y, v.z) == (x, y, z));
        assert!(find(0, 0, 0).is_none(), "state 0 is void");
        assert!(find(1, 0, 0).is_none(), "state 1 is void");
        assert_eq!(find(2, 0, 0).unwrap().color, Color::rgb(255, 0, 0));
        assert_eq!(find(3, 0, 0).unwrap().color, Color::rgb(0, 255, 0));
        assert_eq!(find(3, 0, 0).unwrap().palette_index, 1);
    }

    #[test]
    fn test_iteration_order_is_x_major() {
        let dims = GridDimensions::new(3, 2, 2);
        let pattern = FnPattern::new(1, |_, _, _| 0).unwrap();
        let field = VoxelFieldBuilder::new(dims, 0).build(&pattern, &duo()).unwrap();

        assert_eq!(field.len(), 12, "every cell is filled with zero transparency");
        let coords: Vec<_> = field.voxels().iter().map(|v| (v.x, v.y, v.z)).collect();
        assert_eq!(&coords[..4], &[(0, 0, 0), (0, 0, 1), (0, 1, 0), (0, 1, 1)]);
        assert_eq!(coords[4], (1, 0, 0));
        assert_eq!(coords[11], (2, 1, 1));
    }

    #[test]
    fn test_overflowing_states_clamp_to_last_color() {
        let dims = GridDimensions::new(1, 1, 1);
        let pattern = FnPattern::new(10, |_, _, _| 9).unwrap();
        let field = VoxelFieldBuilder::new(dims, 1).build(&pattern, &duo()).unwrap();
        assert_eq!(field.voxels()[0].palette_index, 1);
    }

    #[test]
    fn test_empty_palette_is_error() {
        let dims = GridDimensions::new(2, 2, 2);
        let pattern = FnPattern::new(2, |_, _, _| 1).unwrap();
        let empty = Palette::new("none", Vec::new());
        assert_eq!(
            VoxelFieldBuilder::new(dims, 0).build(&pattern, &empty).unwrap_err(),
            PatternError::EmptyPalette
        );
    }
}
