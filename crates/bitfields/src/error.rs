//! # Engine Error Types

use bitfields_procedural::PatternError;
use bitfields_rendering::RenderError;
use bitfields_shared::ConfigError;
use thiserror::Error;

/// Errors surfaced to the host.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The catalog has no palette with this many colors.
    #[error("no palette available for {filled} filled states")]
    NoPaletteAvailable {
        /// Requested filled-state count.
        filled: u32,
    },

    /// A catalog palette has no colors.
    #[error("palette '{name}' has no colors")]
    EmptyPalette {
        /// Palette name.
        name: String,
    },

    /// A catalog palette is listed under a different color count than it has.
    #[error("palette '{name}' listed under {listed} filled states has {colors} colors")]
    PaletteSizeMismatch {
        /// Palette name.
        name: String,
        /// Catalog key it was listed under.
        listed: u32,
        /// Colors it actually holds.
        colors: usize,
    },

    /// `filled + transparent` does not fit the 32-bit state space.
    #[error("state space {filled} + {transparent} overflows")]
    StateSpaceOverflow {
        /// Drawn filled-state count.
        filled: u32,
        /// Drawn transparent-state count.
        transparent: u32,
    },

    /// Stats or export requested before the first build.
    #[error("no world has been built yet")]
    NotBuilt,

    /// Invalid configuration or color string.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pattern composition or field construction failed.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// GPU resources could not be created.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Malformed palette catalog.
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog or export file IO.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
