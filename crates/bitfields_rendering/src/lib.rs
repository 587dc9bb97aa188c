//! # BITFIELDS Rendering
//!
//! Two interchangeable renderers for a packed voxel field, chosen once per
//! build from backend capabilities.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        VoxelRenderer                              │
//! ├───────────────────────────────┬──────────────────────────────────┤
//! │ RayMarchRenderer              │ InstancedRenderer                │
//! │  occupancy  (R8Uint, 3D)      │  cube mesh (36 verts)            │
//! │  color ids  (R8Uint, 3D)      │  VoxelInstance[] (pos, color)    │
//! │  palette    (64 × vec4)       │  buried voxels culled            │
//! │  shadow map (depth, optional) │                                  │
//! │  full-screen triangle         │  one instanced draw              │
//! └───────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! [`raymarch::CpuRayMarcher`] runs the shader's exact algorithm on the CPU
//! for headless frames and for validating the GPU path.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bounds;
pub mod camera;
pub mod context;
pub mod error;
pub mod instancing;
pub mod raymarch;
pub mod strategy;

#[cfg(test)]
mod test_support;

pub use bounds::VolumeBounds;
pub use camera::CameraState;
pub use context::{GpuContext, RenderTargets, ShadowResources};
pub use error::{RenderError, RenderResult};
pub use instancing::{InstanceBuilder, InstanceSet, InstancedRenderer, VoxelInstance};
pub use raymarch::{CpuRayMarcher, MarchOutcome, RayMarchRenderer, RayMarchUniforms, ShadowMap};
pub use strategy::{
    create_renderer, select_renderer, BackendCapabilities, RenderStats, RendererInputs,
    RendererKind, VoxelRenderer,
};
