//! Instanced cube fallback.
//!
//! One unit cube mesh, one [`VoxelInstance`] per visible voxel, one draw.
//! Used when the backend cannot sample integer 3D textures or when the host
//! asks for it.

mod builder;
mod instance_data;
mod renderer;

pub use builder::{InstanceBuilder, InstanceSet};
pub use instance_data::{CubeVertex, VoxelInstance, CUBE_VERTICES};
pub use renderer::InstancedRenderer;
