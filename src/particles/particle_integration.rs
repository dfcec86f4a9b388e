use wgpu::{BindGroup, BindGroupLayout, CommandEncoder};
use crate::error::SetupError;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::compute_shader::ComputeShader;
use crate::utils::shader_binary::ShaderBinary;

pub const SIM_PARAMS_BINDING: u32 = 0;
pub const READ_POSITION_BINDING: u32 = 20;
pub const READ_VELOCITY_BINDING: u32 = 21;
pub const WRITE_POSITION_BINDING: u32 = 22;
pub const WRITE_VELOCITY_BINDING: u32 = 23;

/// The compute stage: advances every particle by one velocity step.
pub struct ParticleIntegration {
    integration_pass: ComputeShader,
    bind_group_layout: BindGroupLayout,
}

impl ParticleIntegration {
    pub async fn new(
        wgpu_context: &WgpuContext,
        shader_binary: &ShaderBinary,
        entry_point: &str,
        workgroup_size: u32,
    ) -> Result<Self, SetupError> {
        let bind_group_layout = Self::create_binding_group_layout(wgpu_context);
        let integration_pass = ComputeShader::new(
            wgpu_context,
            shader_binary,
            entry_point,
            &bind_group_layout,
            (workgroup_size, 1, 1),
        ).await?;

        Ok(Self {
            integration_pass,
            bind_group_layout,
        })
    }

    /// Encodes one dispatch covering `particle_count` invocations.
    pub fn dispatch(&self, encoder: &mut CommandEncoder, particle_count: u32, bind_group: &BindGroup) {
        self.integration_pass.dispatch_by_items(encoder, (particle_count, 1, 1), bind_group);
    }

    pub fn bind_group_layout(&self) -> &BindGroupLayout {
        &self.bind_group_layout
    }

    fn create_binding_group_layout(wgpu_context: &WgpuContext) -> BindGroupLayout {
        let bind_group_layout_descriptor = wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle integration bind group layout"),
            entries: &[
                Self::storage_entry(READ_POSITION_BINDING),
                Self::storage_entry(READ_VELOCITY_BINDING),
                Self::storage_entry(WRITE_POSITION_BINDING),
                Self::storage_entry(WRITE_VELOCITY_BINDING),
                // Simulation parameters, opaque to the host
                wgpu::BindGroupLayoutEntry {
                    binding: SIM_PARAMS_BINDING,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        };

        wgpu_context.get_device().create_bind_group_layout(&bind_group_layout_descriptor)
    }

    fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }
}
