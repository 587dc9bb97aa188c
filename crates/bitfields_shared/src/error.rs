//! # Configuration Error Types

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::WorldConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A grid axis was zero.
    #[error("invalid grid dimensions {x}x{y}x{z}: every axis must be positive")]
    InvalidGrid {
        /// Requested x extent.
        x: u32,
        /// Requested y extent.
        y: u32,
        /// Requested z extent.
        z: u32,
    },

    /// The grid has more cells than this platform can index.
    #[error("grid of {cells} cells exceeds the addressable maximum")]
    GridTooLarge {
        /// Total cell count requested.
        cells: u64,
    },

    /// Cell size was zero, negative or not finite.
    #[error("invalid cell size {0}: must be finite and positive")]
    InvalidCellSize(f32),

    /// The filled-state range was empty, inverted or above `MAX_FILLED_STATES`.
    #[error("invalid states range [{min}, {max}]")]
    InvalidStatesRange {
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },

    /// The transparency factor range was inverted or negative.
    #[error("invalid transparent factor range [{min}, {max}]")]
    InvalidTransparentFactor {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// A ray-march parameter was out of range.
    #[error("invalid ray-march setting `{field}`: {reason}")]
    InvalidRayMarch {
        /// Offending field name.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A color string could not be parsed as hex.
    #[error("invalid color `{0}`: expected #rgb or #rrggbb")]
    InvalidColor(String),

    /// TOML syntax or schema error.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
