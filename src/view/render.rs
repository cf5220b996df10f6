use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use thiserror::Error;

use crate::model::{Color, RectShape};
use crate::view::{Canvas, GpuContext};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RectVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ScreenUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2],
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

const INITIAL_VERTEX_CAPACITY: usize = 256;

/// Append two triangles covering the local-space box [min, max] of `rect`
fn push_local_quad(rect: &RectShape, min: Vec2, max: Vec2, color: [f32; 4], out: &mut Vec<RectVertex>) {
    let tl = rect.local_to_world(min);
    let tr = rect.local_to_world(Vec2::new(max.x, min.y));
    let br = rect.local_to_world(max);
    let bl = rect.local_to_world(Vec2::new(min.x, max.y));
    for p in [tl, tr, br, tl, br, bl] {
        out.push(RectVertex { pos: p.to_array(), color });
    }
}

/// Triangulate a rectangle: fill first, then the outline as four bands
/// outside the edges. Transparent parts emit nothing.
pub fn tessellate_rect(rect: &RectShape, out: &mut Vec<RectVertex>) {
    let size = rect.size;

    if !rect.fill.is_transparent() {
        push_local_quad(rect, Vec2::ZERO, size, rect.fill.to_f32_array(), out);
    }

    let t = rect.outline_thickness;
    if t > 0.0 && !rect.outline.is_transparent() {
        let color = rect.outline.to_f32_array();
        // top, bottom, left, right
        push_local_quad(rect, Vec2::new(-t, -t), Vec2::new(size.x + t, 0.0), color, out);
        push_local_quad(rect, Vec2::new(-t, size.y), Vec2::new(size.x + t, size.y + t), color, out);
        push_local_quad(rect, Vec2::new(-t, 0.0), Vec2::new(0.0, size.y), color, out);
        push_local_quad(rect, Vec2::new(size.x, 0.0), Vec2::new(size.x + t, size.y), color, out);
    }
}

/// Batches rectangles for a frame and draws them in a single pass
pub struct RectRenderer {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    screen_buffer: wgpu::Buffer,
    screen_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertices: Vec<RectVertex>,
    clear_color: wgpu::Color,
    /// Logical size the scene is authored in; the surface may be larger
    view_size: Vec2,
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("rect_vertex_buffer"),
        size: (capacity * std::mem::size_of::<RectVertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl RectRenderer {
    pub fn new(gpu: GpuContext, view_size: Vec2) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rect_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rect.wgsl").into()),
        });

        let screen_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screen_buffer"),
            size: std::mem::size_of::<ScreenUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("screen_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("screen_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: screen_buffer.as_entire_binding() }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rect_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("rect_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<RectVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x2 },
                        wgpu::VertexAttribute { offset: 8, shader_location: 1, format: wgpu::VertexFormat::Float32x4 },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // rotation can flip winding
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = create_vertex_buffer(device, INITIAL_VERTEX_CAPACITY);

        Self {
            gpu,
            pipeline,
            screen_buffer,
            screen_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            vertices: Vec::with_capacity(INITIAL_VERTEX_CAPACITY),
            clear_color: wgpu::Color::BLACK,
            view_size,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn ensure_capacity(&mut self) {
        if self.vertices.len() <= self.vertex_capacity {
            return;
        }
        let capacity = self.vertices.len().next_power_of_two();
        tracing::debug!(capacity, "growing rect vertex buffer");
        self.vertex_buffer = create_vertex_buffer(&self.gpu.device, capacity);
        self.vertex_capacity = capacity;
    }
}

impl Canvas for RectRenderer {
    type Error = RenderError;

    fn clear(&mut self, color: Color) {
        self.clear_color = color.to_wgpu();
        self.vertices.clear();
    }

    fn draw_rect(&mut self, rect: &RectShape) {
        tessellate_rect(rect, &mut self.vertices);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_capacity();
        let screen = ScreenUniform { size: self.view_size.to_array(), _pad: [0.0; 2] };
        self.gpu.queue.write_buffer(&self.screen_buffer, 0, bytemuck::bytes_of(&screen));
        if !self.vertices.is_empty() {
            self.gpu.queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
        }

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !self.vertices.is_empty() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..self.vertices.len() as u32, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
