//! Instance and mesh layouts for GPU upload.

use bytemuck::{Pod, Zeroable};

/// Per-voxel instance data.
///
/// Consumed by the vertex shader at locations 2 and 3.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VoxelInstance {
    /// World-space cube center (xyz) + edge length (w).
    pub position_scale: [f32; 4],
    /// Linear RGB (xyz), alpha (w).
    pub color: [f32; 4],
}

impl VoxelInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Cube at `center` with edge `scale`.
    #[inline]
    #[must_use]
    pub const fn new(center: [f32; 3], scale: f32, color: [f32; 3]) -> Self {
        Self {
            position_scale: [center[0], center[1], center[2], scale],
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    /// Vertex buffer layout (instance step, locations 2..=3).
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: VoxelInstance::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Unit cube vertex: position in `[-0.5, 0.5]` and outward face normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Outward face normal.
    pub normal: [f32; 3],
}

impl CubeVertex {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Vertex buffer layout (vertex step, locations 0..=1).
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
        ];
        wgpu::VertexBufferLayout {
            array_stride: CubeVertex::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

const fn face(normal: [f32; 3], corners: [[f32; 3]; 4]) -> [CubeVertex; 6] {
    let [a, b, c, d] = corners;
    [
        CubeVertex::new(a, normal),
        CubeVertex::new(b, normal),
        CubeVertex::new(c, normal),
        CubeVertex::new(a, normal),
        CubeVertex::new(c, normal),
        CubeVertex::new(d, normal),
    ]
}

const N: f32 = -0.5;
const P: f32 = 0.5;

const FACES: [[CubeVertex; 6]; 6] = [
    // +X
    face([1.0, 0.0, 0.0], [[P, N, P], [P, N, N], [P, P, N], [P, P, P]]),
    // -X
    face([-1.0, 0.0, 0.0], [[N, N, N], [N, N, P], [N, P, P], [N, P, N]]),
    // +Y
    face([0.0, 1.0, 0.0], [[N, P, P], [P, P, P], [P, P, N], [N, P, N]]),
    // -Y
    face([0.0, -1.0, 0.0], [[N, N, N], [P, N, N], [P, N, P], [N, N, P]]),
    // +Z
    face([0.0, 0.0, 1.0], [[N, N, P], [P, N, P], [P, P, P], [N, P, P]]),
    // -Z
    face([0.0, 0.0, -1.0], [[P, N, N], [N, N, N], [N, P, N], [P, P, N]]),
];

const fn flatten(faces: [[CubeVertex; 6]; 6]) -> [CubeVertex; 36] {
    let mut out = [CubeVertex::new([0.0; 3], [0.0; 3]); 36];
    let mut i = 0;
    while i < 36 {
        out[i] = faces[i / 6][i % 6];
        i += 1;
    }
    out
}

/// Unit cube as 12 counter-clockwise triangles.
pub const CUBE_VERTICES: [CubeVertex; 36] = flatten(FACES);
