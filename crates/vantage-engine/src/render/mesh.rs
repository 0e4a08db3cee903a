use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::core::DrawPass;
use crate::device::GpuHandles;

use super::sink::{MAT4_SIZE, UniformSlot};

/// Interleaved position + texture coordinate, 20 bytes per vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x2  // uv
    ];

    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            pos: [x, y, z],
            uv: [u, v],
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The three matrices the mesh shader composes, in binding order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MeshUniform {
    Projection,
    Camera,
    Model,
}

impl MeshUniform {
    const ALL: [MeshUniform; 3] = [MeshUniform::Projection, MeshUniform::Camera, MeshUniform::Model];

    fn label(self) -> &'static str {
        match self {
            MeshUniform::Projection => "projection",
            MeshUniform::Camera => "camera",
            MeshUniform::Model => "model",
        }
    }
}

/// Draws a static triangle list with depth testing and back-face culling.
///
/// The matrices live in three uniform buffers, all starting at identity.
/// They are written through [`UniformSlot`]s, typically owned by render
/// objects, never by the renderer itself.
pub struct MeshRenderer {
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniforms: [Arc<wgpu::Buffer>; 3],
    vbo: wgpu::Buffer,
    vertex_count: u32,
}

impl MeshRenderer {
    pub fn new(gpu: &GpuHandles, vertices: &[MeshVertex]) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vantage mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let matrix_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(MAT4_SIZE),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vantage mesh bgl"),
            entries: &[matrix_entry(0), matrix_entry(1), matrix_entry(2)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vantage mesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vantage mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: gpu.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        let identity = Mat4::IDENTITY.to_cols_array();
        let uniforms = MeshUniform::ALL.map(|u| {
            Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(u.label()),
                contents: bytemuck::cast_slice(&identity),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }))
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vantage mesh bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms[0].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniforms[1].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms[2].as_entire_binding(),
                },
            ],
        });

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vantage mesh vbo"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::debug!("mesh renderer ready ({} vertices)", vertices.len());

        Self {
            queue: Arc::clone(&gpu.queue),
            pipeline,
            bind_group,
            uniforms,
            vbo,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Sink writing one of the mesh matrices.
    pub fn slot(&self, uniform: MeshUniform) -> UniformSlot {
        UniformSlot::new(
            uniform.label(),
            Arc::clone(&self.queue),
            Arc::clone(&self.uniforms[uniform as usize]),
        )
    }

    /// Records the mesh into the frame on top of the cleared color and depth
    /// targets.
    pub fn draw(&self, pass: &mut DrawPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }

        let mut rpass = pass.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vantage mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: pass.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: pass.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}
