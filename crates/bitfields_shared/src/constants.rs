//! # Generation Constants
//!
//! Defaults baked into every build unless a config file overrides them.

use crate::grid::GridDimensions;

// =============================================================================
// GRID
// =============================================================================

/// Default grid extent (x, y, z).
pub const DEFAULT_GRID: GridDimensions = GridDimensions::new(128, 256, 128);

/// Default edge length of one voxel in world units.
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

// =============================================================================
// STATE SPACE
// =============================================================================

/// Default inclusive range for the number of filled (colored) states.
pub const DEFAULT_STATES_RANGE: [u32; 2] = [2, 32];

/// Upper bound for `states_range`. Keeps `filled + transparent` well inside `u32`.
pub const MAX_FILLED_STATES: u32 = 1 << 16;

/// Default multipliers applied to `filled` to bound the transparent state count.
pub const DEFAULT_TRANSPARENT_FACTOR: [f32; 2] = [0.51, 5.0];

// =============================================================================
// PALETTE
// =============================================================================

/// Largest palette the color-id volume can address.
///
/// The GPU palette uniform is a fixed `array<vec4<f32>, 64>`.
pub const MAX_PALETTE: usize = 64;
