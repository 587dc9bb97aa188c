//! Voxel list → instance list.

use std::time::Instant;

use bitfields_procedural::{VolumeTextures, Voxel};

use super::instance_data::VoxelInstance;
use crate::bounds::VolumeBounds;

/// Instances for one build.
#[derive(Debug, Clone, Default)]
pub struct InstanceSet {
    /// One entry per drawn voxel, in voxel-list order.
    pub instances: Vec<VoxelInstance>,
    /// Voxels skipped because all six neighbors are occupied.
    pub culled: usize,
}

impl InstanceSet {
    /// Raw bytes for the instance buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if nothing will be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Places one cube per voxel, using the same centering as the ray marcher.
#[derive(Debug, Clone, Copy)]
pub struct InstanceBuilder {
    bounds: VolumeBounds,
    cull_buried: bool,
}

impl InstanceBuilder {
    /// Builder for a grid placed at `bounds`.
    #[must_use]
    pub const fn new(bounds: VolumeBounds, cull_buried: bool) -> Self {
        Self { bounds, cull_buried }
    }

    /// Converts `voxels`. `volume` answers neighbor queries for culling.
    #[must_use]
    pub fn build(&self, voxels: &[Voxel], volume: &VolumeTextures) -> InstanceSet {
        let start = Instant::now();
        let mut set = InstanceSet {
            instances: Vec::with_capacity(voxels.len()),
            culled: 0,
        };

        for voxel in voxels {
            let (x, y, z) = (i64::from(voxel.x), i64::from(voxel.y), i64::from(voxel.z));
            if self.cull_buried && volume.is_buried(x, y, z) {
                set.culled += 1;
                continue;
            }
            let center = self.bounds.voxel_center(voxel.x, voxel.y, voxel.z);
            set.instances.push(VoxelInstance::new(
                center.to_array(),
                self.bounds.cell_size,
                voxel.color.to_linear_f32(),
            ));
        }

        tracing::debug!(
            instances = set.instances.len(),
            culled = set.culled,
            elapsed_us = start.elapsed().as_micros(),
            "instances built"
        );
        set
    }
}
