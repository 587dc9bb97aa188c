//! # BITFIELDS Procedural Generation
//!
//! Deterministic synthesis of voxel fields from ternary bitwise gates.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────────┐   ┌───────────────────┐
//! │ gates        │──►│ PatternComposer│──►│ VoxelFieldBuilder│──►│ VolumeTexturePacker│
//! │ (truth table │   │ base × gate ×  │   │ state < T → void │   │ occupancy[N]      │
//! │  + named)    │   │ perm × offsets │   │ else palette idx │   │ color_id[N]       │
//! └──────────────┘   └────────────────┘   └──────────────────┘   └───────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed` and grid, composition draws, the voxel list and
//! the packed volumes are identical on every platform.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bitfields_procedural::{PatternComposer, VoxelFieldBuilder, WorldSeed};
//!
//! let mut rng = WorldSeed::new(7).rng();
//! let pattern = PatternComposer::new(dims, GateMode::Mixed).compose(&mut rng, 8)?;
//! let field = VoxelFieldBuilder::new(dims, 4).build(&pattern, &palette)?;
//! let volume = VolumeTexturePacker::pack(&field);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod export;
pub mod field;
pub mod gates;
pub mod patterns;
pub mod seed;
pub mod volume;

pub use error::{PatternError, PatternResult};
pub use export::{export_file_name, export_table};
pub use field::{Voxel, VoxelField, VoxelFieldBuilder};
pub use gates::{evaluate_gate, Gate, NamedGate};
pub use patterns::{
    AxisPermutation, BasePattern, ComposedPattern, FnPattern, PatternComposer, PatternFunction,
};
pub use seed::WorldSeed;
pub use volume::{VolumeTexturePacker, VolumeTextures};
