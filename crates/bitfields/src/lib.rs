//! # BITFIELDS
//!
//! Host-facing engine for the procedural voxel bitfield synthesizer.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ PaletteCatalog │──>│  selection   │──>│ PatternComposer│
//! └────────────────┘   │ filled/trans │   │ base∘gate∘perm │
//!                      └──────────────┘   └───────┬────────┘
//!                                                 │
//!   ┌──────────────┐   ┌──────────────┐   ┌───────▼────────┐
//!   │ VoxelRenderer│<──│VolumeTextures│<──│   VoxelField   │
//!   │ march | inst │   │ occ + ids    │   │ sparse voxels  │
//!   └──────┬───────┘   └──────────────┘   └────────────────┘
//!          │
//!   ┌──────▼───────────────────────────────────────────────┐
//!   │ SwapSlot<Scene>: frames hold an Arc, rebuilds swap    │
//!   └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `catalog`: palette catalogs keyed by filled-state count
//! - `selection`: seeded palette and backdrop draws
//! - `world`: one complete CPU-side build
//! - `swap`: atomically replaced active scene
//! - `engine`: the host API

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod selection;
pub mod swap;
pub mod world;

pub use bitfields_procedural as procedural;
pub use bitfields_rendering as rendering;
pub use bitfields_shared as shared;

pub use catalog::{MemoryCatalog, PaletteCatalog, PaletteEntry};
pub use engine::{Engine, Scene};
pub use error::{EngineError, EngineResult};
pub use selection::{pick_palette, pick_two_distinct, PaletteSelection};
pub use swap::SwapSlot;
pub use world::{Backdrop, World, WorldStats};
