//! # Pattern Error Types

use thiserror::Error;

/// Errors raised while composing patterns or building fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    /// Minkowski exponent was zero, negative or not finite.
    #[error("invalid minkowski exponent {0}: must be finite and positive")]
    InvalidExponent(f64),

    /// Z-band width of zero would divide by zero.
    #[error("band width must be at least 1")]
    ZeroBandWidth,

    /// A pattern must map into at least one state.
    #[error("total states must be at least 1")]
    ZeroStates,

    /// Field building needs at least one color.
    #[error("cannot build a field with an empty palette")]
    EmptyPalette,
}

/// Result type for pattern operations.
pub type PatternResult<T> = Result<T, PatternError>;
