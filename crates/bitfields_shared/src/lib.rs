//! # BITFIELDS Shared
//!
//! Types used by every stage of the voxel bitfield pipeline.
//!
//! ```text
//! WorldConfig ──► GridDimensions ──► (procedural) ──► Palette ──► (rendering)
//! ```
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on `wgpu` or any window-related crate.
//! If you need graphics types, put them in `bitfields_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;

pub use color::{Color, Palette};
pub use config::{GateMode, RayMarchSettings, RendererPreference, WorldConfig};
pub use constants::{DEFAULT_CELL_SIZE, DEFAULT_GRID, MAX_FILLED_STATES, MAX_PALETTE};
pub use error::{ConfigError, ConfigResult};
pub use grid::GridDimensions;
