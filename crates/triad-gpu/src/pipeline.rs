//! The color balance render pass.
//!
//! One full-surface draw per render: the source image is sampled with a
//! nearest-neighbor, clamp-to-edge sampler, the fragment stage applies
//! the tonal-weight kernel, and the result lands in an offscreen target
//! that is read back before the call returns.

use std::num::NonZeroU64;
use std::time::Instant;

use triad_core::image::BalanceImage;
use triad_core::offsets::OffsetState;
use wgpu::util::DeviceExt;

use crate::context::{GpuContext, PipelineError};
use crate::readback;

/// Target format. 8-bit UNORM so the readback bytes are the exported
/// pixels with no further conversion.
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Unit quad texture coordinates, two triangles.
const TEXCOORD_QUAD: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
];

/// Uniform block for the balance pass. Layout matches `balance.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BalanceUniforms {
    resolution: [f32; 2],
    _pad0: [f32; 2],
    shadows: [f32; 3],
    _pad1: f32,
    midtones: [f32; 3],
    _pad2: f32,
    highlights: [f32; 3],
    _pad3: f32,
}

impl BalanceUniforms {
    fn new(width: u32, height: u32, state: &OffsetState) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            _pad0: [0.0; 2],
            shadows: state.shadows.to_array(),
            _pad1: 0.0,
            midtones: state.midtones.to_array(),
            _pad2: 0.0,
            highlights: state.highlights.to_array(),
            _pad3: 0.0,
        }
    }
}

/// Output resources cached per image size (reallocated on change).
struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging: wgpu::Buffer,
    padded_bytes_per_row: u32,
    width: u32,
    height: u32,
}

/// Executes the balance kernel over a whole image with one draw.
///
/// Construction compiles the shader and builds every long-lived GPU
/// object; `render` only uploads per-frame data. A pipeline is never
/// re-initialized — after a fatal error, build a new instance.
pub struct BalancePipeline {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    /// Pixel-space rectangle, rewritten for each source size.
    position_buffer: wgpu::Buffer,
    /// Unit quad texture coordinates, written once.
    texcoord_buffer: wgpu::Buffer,
    /// Cached output resources, reallocated on dimension change.
    target: Option<RenderTarget>,
}

impl BalancePipeline {
    /// Compile `balance.wgsl` and build the render pipeline.
    ///
    /// Compile or link failures on this device surface as
    /// [`PipelineError::ShaderCompileFailed`].
    pub fn new(ctx: &GpuContext) -> Result<Self, PipelineError> {
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();

        // Validation errors from shader compilation and pipeline creation
        // are collected in one scope and surfaced instead of panicking.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("triad_balance_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/balance.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("triad_balance_layout"),
            entries: &[
                // binding 0: balance uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<BalanceUniforms>() as u64
                        ),
                    },
                    count: None,
                },
                // binding 1: source image
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // binding 2: nearest/clamp sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("triad_balance_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 1,
                }],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("triad_balance_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(PipelineError::ShaderCompileFailed(err.to_string()));
        }

        // Border texels must not bleed: clamp addressing, nearest filtering.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("triad_source_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("triad_balance_uniforms"),
            size: std::mem::size_of::<BalanceUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("triad_position_quad"),
            size: std::mem::size_of::<[[f32; 2]; 6]>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texcoord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("triad_texcoord_quad"),
            contents: bytemuck::cast_slice(&TEXCOORD_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            position_buffer,
            texcoord_buffer,
            target: None,
        })
    }

    /// Render `image` under the offsets in `state` and return the result.
    ///
    /// Synchronous: the returned buffer holds the completed frame. Any
    /// image size and any sequence of state mutations between calls is
    /// fine; only the compiled pipeline objects persist across renders.
    pub fn render(&mut self, image: &BalanceImage, state: &OffsetState) -> BalanceImage {
        let start = Instant::now();

        let source_view = self.upload_source(image);
        self.ensure_target(image.width, image.height);
        let target = self.target.as_ref().expect("target allocated above");

        let uniforms = BalanceUniforms::new(image.width, image.height, state);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let rect = pixel_rect(image.width, image.height);
        self.queue
            .write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(&rect));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("triad_balance_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("triad_balance_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("triad_balance_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            pass.set_vertex_buffer(1, self.texcoord_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(target.padded_bytes_per_row),
                    rows_per_image: Some(target.height),
                },
            },
            wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let result = readback::download_target(
            &self.device,
            &target.staging,
            target.width,
            target.height,
            target.padded_bytes_per_row,
        );

        tracing::debug!(
            "balance render {}x{}: {:.2}ms",
            image.width,
            image.height,
            start.elapsed().as_secs_f64() * 1000.0
        );

        result
    }

    /// Upload the source image as a texture and return its view.
    ///
    /// Sources are replaced wholesale on image swap, so no texture is
    /// cached between renders.
    fn upload_source(&self, image: &BalanceImage) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("triad_source_texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensure the target texture and staging buffer match the given size.
    fn ensure_target(&mut self, width: u32, height: u32) {
        let up_to_date = matches!(
            &self.target,
            Some(t) if t.width == width && t.height == height
        );
        if up_to_date {
            return;
        }

        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = (width * 4).div_ceil(align) * align;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("triad_target_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("triad_target_staging"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        self.target = Some(RenderTarget {
            texture,
            view,
            staging,
            padded_bytes_per_row,
            width,
            height,
        });
    }
}

/// Pixel-space rectangle covering the whole target, two triangles.
fn pixel_rect(width: u32, height: u32) -> [[f32; 2]; 6] {
    let w = width as f32;
    let h = height as f32;
    [
        [0.0, 0.0],
        [w, 0.0],
        [0.0, h],
        [0.0, h],
        [w, 0.0],
        [w, h],
    ]
}
