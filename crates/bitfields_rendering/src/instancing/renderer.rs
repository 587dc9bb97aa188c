//! Instanced cube renderer.

use std::sync::atomic::{AtomicU64, Ordering};

use bitfields_shared::RayMarchSettings;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use super::builder::InstanceSet;
use super::instance_data::{CubeVertex, VoxelInstance, CUBE_VERTICES};
use crate::camera::CameraState;
use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};
use crate::strategy::{RenderStats, RendererKind, VoxelRenderer};

#[allow(clippy::cast_possible_truncation)]
const CUBE_VERTEX_COUNT: u32 = CUBE_VERTICES.len() as u32;

const INSTANCED_WGSL: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
    shading: vec4<f32>,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) position_scale: vec4<f32>,
    @location(3) color: vec4<f32>,
) -> VertexOut {
    var out: VertexOut;
    let world = position_scale.xyz + position * position_scale.w;
    out.clip = u.view_proj * vec4<f32>(world, 1.0);
    out.normal = normal;
    out.color = color.rgb;
    return out;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    // light_dir is the travel direction; faces see its reverse
    let diff = max(dot(normalize(in.normal), -u.light_dir.xyz), 0.0);
    let color = in.color * (u.shading.x + u.shading.y * diff);
    return vec4<f32>(pow(color, vec3<f32>(1.0 / 2.2)), 1.0);
}
"#;

/// Uniform block for the instanced pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct InstancedUniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    shading: [f32; 4],
}

impl InstancedUniforms {
    fn new(settings: &RayMarchSettings) -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            light_dir: Vec3::from(settings.light_dir)
                .normalize_or_zero()
                .extend(0.0)
                .to_array(),
            shading: [settings.ambient, settings.diffuse, 0.0, 0.0],
        }
    }
}

/// Draws an [`InstanceSet`] in one instanced call.
pub struct InstancedRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    uniforms: Mutex<InstancedUniforms>,
    instance_count: u32,
    culled: u32,
    frames: AtomicU64,
}

impl InstancedRenderer {
    /// Uploads `set` and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InstanceBufferTooLarge`] when the instance
    /// buffer would exceed the device's buffer size limit.
    pub fn new(ctx: &GpuContext, set: &InstanceSet, settings: &RayMarchSettings) -> RenderResult<Self> {
        let device = &ctx.device;
        let bytes = set.as_bytes();
        let limit = ctx.capabilities.max_buffer_size;
        if bytes.len() as u64 > limit {
            return Err(RenderError::InstanceBufferTooLarge {
                bytes: bytes.len() as u64,
                limit,
            });
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Zero-size vertex buffers are invalid; keep one zeroed slot.
        let fallback = [VoxelInstance::default()];
        let contents = if set.is_empty() {
            bytemuck::cast_slice(&fallback)
        } else {
            bytes
        };
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Voxel Instance Buffer"),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = InstancedUniforms::new(settings);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instanced Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Instanced Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Instanced Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Instanced Voxel Shader"),
            source: wgpu::ShaderSource::Wgsl(INSTANCED_WGSL.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Instanced Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Instanced Voxel Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[CubeVertex::layout(), VoxelInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.targets.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: ctx.targets.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let instance_count = u32::try_from(set.len()).unwrap_or(u32::MAX);
        let culled = u32::try_from(set.culled).unwrap_or(u32::MAX);
        tracing::info!(
            instances = instance_count,
            culled,
            instance_bytes = bytes.len(),
            "instanced voxels uploaded"
        );

        Ok(Self {
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            instance_buffer,
            uniforms: Mutex::new(uniforms),
            instance_count,
            culled,
            frames: AtomicU64::new(0),
        })
    }

    /// Number of cubes drawn per frame.
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

impl VoxelRenderer for InstancedRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Instanced
    }

    fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraState) {
        let mut uniforms = self.uniforms.lock();
        uniforms.view_proj = camera.view_projection().to_cols_array_2d();
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&*uniforms));
    }

    fn resize(&self, _queue: &wgpu::Queue, _width: u32, _height: u32) {
        // Aspect lives in the camera projection; nothing is resolution-bound.
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw(0..CUBE_VERTEX_COUNT, 0..self.instance_count);
    }

    fn stats(&self) -> RenderStats {
        RenderStats {
            kind: RendererKind::Instanced,
            draw_calls: u32::from(self.instance_count > 0),
            instances: self.instance_count,
            culled: self.culled,
            voxels: self.instance_count + self.culled,
            gpu_bytes: u64::from(self.instance_count) * VoxelInstance::SIZE as u64,
            frames: self.frames.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<InstancedUniforms>(), 64 + 2 * 16);
    }

    #[test]
    fn test_uniform_light_normalized() {
        let u = InstancedUniforms::new(&RayMarchSettings::default());
        let len = (u.light_dir[0].powi(2) + u.light_dir[1].powi(2) + u.light_dir[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert_eq!(u.shading[0], 0.2);
    }

    #[test]
    fn test_shader_validates() {
        crate::test_support::validate_wgsl("instanced", INSTANCED_WGSL);
    }
}
