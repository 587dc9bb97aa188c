//! GPU ray-march renderer.
//!
//! Uploads the packed volumes once per build as two `R8Uint` 3D textures
//! and draws one full-screen triangle per frame. Only the uniform block
//! changes between frames.

use std::sync::atomic::{AtomicU64, Ordering};

use bitfields_procedural::VolumeTextures;
use bitfields_shared::{Palette, RayMarchSettings};
use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use super::{shader_source, PaletteUniform, RayMarchUniforms};
use crate::bounds::VolumeBounds;
use crate::camera::CameraState;
use crate::context::{GpuContext, ShadowResources};
use crate::error::{RenderError, RenderResult};
use crate::strategy::{RenderStats, RendererKind, VoxelRenderer};

/// Volumetric renderer for one build.
pub struct RayMarchRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    uniforms: Mutex<RayMarchUniforms>,
    texture_bytes: u64,
    occupied: u32,
    frames: AtomicU64,
}

impl RayMarchRenderer {
    /// Uploads `volume` and `palette` and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::VolumeSamplingUnsupported`] when the backend
    /// cannot load integer 3D textures, or [`RenderError::VolumeTooLarge`]
    /// when a grid axis exceeds the 3D texture limit.
    pub fn new(
        ctx: &GpuContext,
        volume: &VolumeTextures,
        palette: &Palette,
        bounds: &VolumeBounds,
        settings: &RayMarchSettings,
        shadow: Option<&ShadowResources>,
    ) -> RenderResult<Self> {
        let caps = &ctx.capabilities;
        if !caps.integer_volume_sampling {
            return Err(RenderError::VolumeSamplingUnsupported);
        }
        let dims = volume.dims();
        if dims.max_axis() > caps.max_texture_dimension_3d {
            return Err(RenderError::VolumeTooLarge {
                axis: dims.max_axis(),
                limit: caps.max_texture_dimension_3d,
            });
        }

        let device = &ctx.device;
        let extent = wgpu::Extent3d {
            width: dims.x,
            height: dims.y,
            depth_or_array_layers: dims.z,
        };

        let occupancy = upload_volume(ctx, "Occupancy Volume", extent, volume.occupancy());
        let color_ids = upload_volume(ctx, "Color Id Volume", extent, volume.color_ids());

        let palette_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Palette Uniform"),
            contents: bytemuck::bytes_of(&PaletteUniform::from_palette(palette)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let mut uniforms = RayMarchUniforms::new(bounds, dims, settings);
        uniforms.set_shadow(shadow.map(|s| s.light_matrix));
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ray March Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // A 1x1 depth texture stands in when no shadow map is bound.
        let placeholder;
        let shadow_view = match shadow {
            Some(s) => &s.depth_view,
            None => {
                placeholder = placeholder_depth(ctx);
                &placeholder
            }
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Ray March Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                volume_entry(1),
                volume_entry(2),
                uniform_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Ray March Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&occupancy),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&color_ids),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: palette_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ray March Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ray March Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ray March Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.targets.color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // The march has no per-fragment depth; it neither writes nor tests.
            depth_stencil: ctx.targets.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let texture_bytes = 2 * volume.occupancy().len() as u64;
        let occupied = u32::try_from(volume.occupied_count()).unwrap_or(u32::MAX);
        tracing::info!(
            dims = %dims,
            texture_bytes,
            occupied,
            shadows = uniforms.shadows_enabled(),
            "ray-march volumes uploaded"
        );

        Ok(Self {
            pipeline,
            bind_group,
            uniform_buffer,
            uniforms: Mutex::new(uniforms),
            texture_bytes,
            occupied,
            frames: AtomicU64::new(0),
        })
    }

    /// Snapshot of the uniforms most recently written.
    #[must_use]
    pub fn uniforms(&self) -> RayMarchUniforms {
        *self.uniforms.lock()
    }

    fn flush(&self, queue: &wgpu::Queue, uniforms: &RayMarchUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

impl VoxelRenderer for RayMarchRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::RayMarch
    }

    fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraState) {
        let mut uniforms = self.uniforms.lock();
        uniforms.set_camera(camera);
        self.flush(queue, &uniforms);
    }

    fn resize(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        let mut uniforms = self.uniforms.lock();
        uniforms.set_resolution(width, height);
        self.flush(queue, &uniforms);
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    fn stats(&self) -> RenderStats {
        RenderStats {
            kind: RendererKind::RayMarch,
            draw_calls: 1,
            instances: 0,
            culled: 0,
            voxels: self.occupied,
            gpu_bytes: self.texture_bytes,
            frames: self.frames.load(Ordering::Relaxed),
        }
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn volume_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Uint,
            view_dimension: wgpu::TextureViewDimension::D3,
            multisampled: false,
        },
        count: None,
    }
}

fn upload_volume(
    ctx: &GpuContext,
    label: &str,
    extent: wgpu::Extent3d,
    bytes: &[u8],
) -> wgpu::TextureView {
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D3,
        format: wgpu::TextureFormat::R8Uint,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    // One byte per texel: a row is W bytes, a slice is H rows.
    ctx.queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(extent.width),
            rows_per_image: Some(extent.height),
        },
        extent,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn placeholder_depth(ctx: &GpuContext) -> wgpu::TextureView {
    ctx.device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Placeholder"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}
