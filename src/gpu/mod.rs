//! wgpu presenter for the showcase window.
//!
//! Two passes share one shader module and one bind group:
//!
//! 1. a fullscreen triangle paints the container background with the beam
//!    glow blended over it
//! 2. a quad carrying the sparkle canvas is drawn on top, transformed by the
//!    card tilt, with premultiplied alpha blending

mod canvas;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, info};
use winit::window::Window;
use wgpu::util::DeviceExt;

use crate::color::Color;
use crate::error::GpuError;
use crate::raster::PixelCanvas;

pub use canvas::CanvasTexture;

/// Presenter shader. Colors arrive premultiplied and already sRGB-encoded.
pub const PRESENT_SHADER: &str = r#"
struct Uniforms {
    panel: mat4x4<f32>,
    background: vec4<f32>,
    glow: vec4<f32>,
    viewport: vec4<f32>,
    palette: array<vec4<f32>, 5>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var canvas: texture_2d<f32>;
@group(0) @binding(2)
var canvas_sampler: sampler;

const TAU: f32 = 6.283185307;

@vertex
fn vs_backdrop(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = positions[vertex_index] * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    return out;
}

fn conic(angle: f32) -> vec3<f32> {
    let t = fract(angle / TAU) * 5.0;
    let i = u32(floor(t)) % 5u;
    let j = (i + 1u) % 5u;
    return mix(uniforms.palette[i].rgb, uniforms.palette[j].rgb, fract(t));
}

@fragment
fn fs_backdrop(in: VertexOutput) -> @location(0) vec4<f32> {
    let pixel = in.clip_position.xy;
    let delta = pixel - uniforms.glow.xy;
    let radius = max(uniforms.glow.z, 1.0);
    let falloff = exp(-dot(delta, delta) / (2.0 * radius * radius));
    let angle = atan2(delta.y, delta.x) + uniforms.viewport.z * 0.1;
    let a = clamp(uniforms.glow.w * falloff, 0.0, 1.0);

    let glow = vec4<f32>(conic(angle) * a, a);
    return glow + uniforms.background * (1.0 - a);
}

@vertex
fn vs_panel(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    var out: VertexOutput;
    out.clip_position = uniforms.panel * vec4<f32>(corner, 0.0, 1.0);
    out.uv = corner * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    return out;
}

@fragment
fn fs_panel(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(canvas, canvas_sampler, in.uv);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    panel: [[f32; 4]; 4],
    background: [f32; 4],
    /// Center x, center y, radius (px), opacity.
    glow: [f32; 4],
    /// Width, height, time (s), unused.
    viewport: [f32; 4],
    palette: [[f32; 4]; 5],
}

/// Everything drawn in one presented frame, besides the sparkle canvas.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    pub glow_center: Vec2,
    pub glow_radius: f32,
    pub glow_opacity: f32,
    pub palette: [Color; 5],
    /// Card transform in card-centered pixel space, see [`crate::tilt::CardTilt::transform`].
    pub panel: Mat4,
    /// Seconds since start.
    pub time: f32,
}

/// Map a transform in card-centered pixel space (y down) onto the clip space
/// of a panel covering a `width` x `height` viewport.
///
/// Depth is flattened to zero; only the perspective divide is kept.
pub fn panel_clip_transform(transform: Mat4, width: f32, height: f32) -> Mat4 {
    let half = Vec2::new(width.max(1.0), height.max(1.0)) * 0.5;
    let to_pixels = Mat4::from_scale(Vec3::new(half.x, -half.y, 1.0));
    let to_clip = Mat4::from_scale(Vec3::new(1.0 / half.x, -1.0 / half.y, 0.0));
    to_clip * transform * to_pixels
}

pub struct Presenter {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    backdrop_pipeline: wgpu::RenderPipeline,
    panel_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    canvas: CanvasTexture,
}

impl Presenter {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        info!(adapter = %adapter.get_info().name, "presenter initialized");

        let surface_caps = surface.get_capabilities(&adapter);
        // Colors are already sRGB-encoded, so prefer a non-sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let canvas = CanvasTexture::new(&device, config.width, config.height);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Present Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = create_bind_group(&device, &bind_group_layout, &uniform_buffer, &canvas);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(PRESENT_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let backdrop_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            ("vs_backdrop", "fs_backdrop"),
            surface_format,
            None,
        );
        let panel_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            ("vs_panel", "fs_panel"),
            surface_format,
            Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            backdrop_pipeline,
            panel_pipeline,
            uniform_buffer,
            bind_group_layout,
            bind_group,
            canvas,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            debug!(width = new_size.width, height = new_size.height, "surface reconfigured");
        }
    }

    /// Reconfigure the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Draw the backdrop and, if there is one, the sparkle canvas.
    pub fn render(&mut self, scene: &Scene, canvas: Option<&PixelCanvas>) -> Result<(), wgpu::SurfaceError> {
        let panel = match canvas {
            Some(canvas) if canvas.width() > 0 && canvas.height() > 0 => {
                if self.canvas.upload(&self.device, &self.queue, canvas) {
                    self.bind_group =
                        create_bind_group(&self.device, &self.bind_group_layout, &self.uniform_buffer, &self.canvas);
                }
                true
            }
            _ => false,
        };

        let (width, height) = (self.config.width as f32, self.config.height as f32);
        let uniforms = Uniforms {
            panel: panel_clip_transform(scene.panel, width, height).to_cols_array_2d(),
            background: scene.background.premultiplied().to_array(),
            glow: [scene.glow_center.x, scene.glow_center.y, scene.glow_radius, scene.glow_opacity],
            viewport: [width, height, scene.time, 0.0],
            palette: scene.palette.map(|c| [c.r, c.g, c.b, 1.0]),
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Present Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_pipeline(&self.backdrop_pipeline);
            render_pass.draw(0..3, 0..1);

            if panel {
                render_pass.set_pipeline(&self.panel_pipeline);
                render_pass.draw(0..6, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    canvas: &CanvasTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Present Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(canvas.view()),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(canvas.sampler()),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vertex_entry, fragment_entry): (&str, &str),
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vertex_entry),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
