use glam::{Vec2, Vec4};
use wgpu::{BindGroup, BindGroupLayout, VertexAttribute};
use crate::error::SetupError;
use crate::particles::particle_buffers::{PairId, ParticleBuffers, ParticleColor, QUAD_VERTICES};
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::gpu_buffer::GpuBuffer;
use crate::utils::pop_backend_error;
use crate::utils::shader_binary::ShaderBinary;

pub const VS_ENTRY_POINT: &str = "vs_particle";
pub const FS_ENTRY_POINT: &str = "fs_particle";
pub const SCREEN_UNIFORM_BINDING: u32 = 0;

const QUAD_ATTRIBUTES: [VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const COLOR_ATTRIBUTES: [VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Unorm8x4];
const POSITION_ATTRIBUTES: [VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];

/// Canvas size and particle size in pixels, read by the vertex stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniform {
    pub size: Vec2,
    pub particle_size: f32,
    _padding: f32,
}

impl ScreenUniform {
    pub fn new(size: Vec2, particle_size: f32) -> Self {
        Self { size, particle_size, _padding: 0.0 }
    }
}

/// The render stage: draws one camera-facing quad per particle.
pub struct ParticleDrawer {
    render_pipeline: wgpu::RenderPipeline,
    screen_uniform: GpuBuffer<ScreenUniform>,
    screen_bind_group: BindGroup,
    particle_size: f32,
}

impl ParticleDrawer {
    pub async fn new(
        wgpu_context: &WgpuContext,
        vertex_shader: &ShaderBinary,
        fragment_shader: &ShaderBinary,
        color_target_format: wgpu::TextureFormat,
        canvas_size: Vec2,
        particle_size: f32,
    ) -> Result<Self, SetupError> {
        let device = wgpu_context.get_device();

        let screen_uniform = GpuBuffer::new(
            wgpu_context,
            "Vertex uniform buffer",
            &[ScreenUniform::new(canvas_size, particle_size)],
            wgpu::BufferUsages::UNIFORM,
        );
        let screen_bind_group_layout = Self::create_screen_bind_group_layout(wgpu_context);
        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Vertex uniform bind group"),
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: SCREEN_UNIFORM_BINDING,
                resource: screen_uniform.buffer().as_entire_binding(),
            }],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = vertex_shader.create_module(wgpu_context, "Particle vertex shader");
        let fragment_module = fragment_shader.create_module(wgpu_context, "Particle fragment shader");

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle render pipeline layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle render pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(VS_ENTRY_POINT),
                buffers: &Self::vertex_buffer_layouts(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(FS_ENTRY_POINT),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_target_format,
                    blend: Some(Self::blend_state()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        pop_backend_error(wgpu_context).await?;
        log::debug!("Created particle render pipeline for {:?}", color_target_format);

        Ok(Self {
            render_pipeline,
            screen_uniform,
            screen_bind_group,
            particle_size,
        })
    }

    /// Quad corners per vertex, then color and position per instance.
    pub fn vertex_buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
        [
            wgpu::VertexBufferLayout {
                array_stride: size_of::<Vec2>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &QUAD_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: size_of::<ParticleColor>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &COLOR_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: size_of::<Vec4>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POSITION_ATTRIBUTES,
            },
        ]
    }

    /// `one` / `one-minus-src-alpha` on both color and alpha.
    pub fn blend_state() -> wgpu::BlendState {
        let component = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        };
        wgpu::BlendState { color: component, alpha: component }
    }

    /// Rewrites the canvas size, the bind group keeps pointing at the same buffer.
    pub fn resize(&self, wgpu_context: &WgpuContext, canvas_size: Vec2) {
        self.screen_uniform.write(wgpu_context, &[ScreenUniform::new(canvas_size, self.particle_size)]);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, particle_buffers: &ParticleBuffers, pair: PairId) {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, particle_buffers.quad().buffer().slice(..));
        render_pass.set_vertex_buffer(1, particle_buffers.colors().buffer().slice(..));
        render_pass.set_vertex_buffer(2, particle_buffers.pair(pair).positions.buffer().slice(..));
        render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
        render_pass.draw(0..QUAD_VERTICES.len() as u32, 0..particle_buffers.particle_count());
    }

    pub fn screen_uniform(&self) -> &GpuBuffer<ScreenUniform> {
        &self.screen_uniform
    }

    fn create_screen_bind_group_layout(wgpu_context: &WgpuContext) -> BindGroupLayout {
        wgpu_context.get_device().create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Vertex uniform bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: SCREEN_UNIFORM_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }
            ],
        })
    }
}
