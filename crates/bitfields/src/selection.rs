//! Seeded palette and backdrop draws.
//!
//! Draw order per build: `filled`, then `transparent`, then the palette
//! index. Changing the order changes every seeded build.

use bitfields_shared::{Color, Palette, WorldConfig};
use rand::Rng;

use crate::catalog::PaletteCatalog;
use crate::error::{EngineError, EngineResult};

/// State counts and palette for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSelection {
    /// Colored states.
    pub filled: u32,
    /// Void states below the first color.
    pub transparent: u32,
    /// Chosen palette.
    pub palette: Palette,
}

impl PaletteSelection {
    /// `filled + transparent`: the pattern's state space.
    #[must_use]
    pub fn total_states(&self) -> u32 {
        self.filled.saturating_add(self.transparent)
    }

    /// Checks that the palette holds exactly `filled` colors and that the
    /// state space fits in `u32`.
    ///
    /// # Errors
    ///
    /// [`EngineError::PaletteSizeMismatch`] or
    /// [`EngineError::StateSpaceOverflow`].
    pub fn validate(&self) -> EngineResult<()> {
        let colors = self.palette.len();
        if colors != self.filled as usize {
            return Err(EngineError::PaletteSizeMismatch {
                name: self.palette.name.clone(),
                listed: self.filled,
                colors,
            });
        }
        if self.filled.checked_add(self.transparent).is_none() {
            return Err(EngineError::StateSpaceOverflow {
                filled: self.filled,
                transparent: self.transparent,
            });
        }
        Ok(())
    }
}

/// Draws `filled`, `transparent` and a palette.
///
/// `filled` is uniform in `states_range`; `transparent` is uniform in
/// `[floor(filled * f0), floor(filled * f1)]`.
///
/// # Errors
///
/// Returns [`EngineError::NoPaletteAvailable`] when the catalog has nothing
/// for the drawn `filled`, [`EngineError::PaletteSizeMismatch`] when the
/// chosen palette does not hold exactly `filled` colors,
/// [`EngineError::StateSpaceOverflow`] when `filled + transparent` does not
/// fit in `u32`, or the entry's own parse error.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn pick_palette<R: Rng + ?Sized>(
    rng: &mut R,
    config: &WorldConfig,
    catalog: &dyn PaletteCatalog,
) -> EngineResult<PaletteSelection> {
    let [min, max] = config.states_range;
    let filled = rng.gen_range(min.min(max)..=max.max(min));

    let [f0, f1] = config.transparent_factor;
    let lo = (filled as f32 * f0).floor().max(0.0) as u32;
    let hi = (filled as f32 * f1).floor().max(0.0) as u32;
    let transparent = rng.gen_range(lo.min(hi)..=hi.max(lo));

    let list = catalog.palettes(filled);
    if list.is_empty() {
        return Err(EngineError::NoPaletteAvailable { filled });
    }
    let entry = &list[rng.gen_range(0..list.len())];
    let selection = PaletteSelection {
        filled,
        transparent,
        palette: entry.to_palette()?,
    };
    selection.validate()?;

    tracing::debug!(filled, transparent, palette = %selection.palette.name, "palette selected");
    Ok(selection)
}

/// Two palette colors for the clear color and the ground plane.
///
/// They differ whenever the palette holds two distinct colors; otherwise
/// both are the single available color. `None` for an empty palette.
pub fn pick_two_distinct<R: Rng + ?Sized>(rng: &mut R, palette: &Palette) -> Option<(Color, Color)> {
    if palette.colors.is_empty() {
        return None;
    }
    let background = palette.colors[rng.gen_range(0..palette.colors.len())];
    let others: Vec<Color> = palette
        .colors
        .iter()
        .copied()
        .filter(|&c| c != background)
        .collect();
    let ground = if others.is_empty() {
        background
    } else {
        others[rng.gen_range(0..others.len())]
    };
    Some((background, ground))
}
