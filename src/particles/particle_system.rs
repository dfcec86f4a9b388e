use glam::Vec2;
use crate::config::FieldConfig;
use crate::error::SetupError;
use crate::particles::frame_loop::FrameLoop;
use crate::particles::particle_bind_groups::BindGroupSet;
use crate::particles::particle_buffers::{BufferSizes, ParticleBuffers, ParticleSeed};
use crate::particles::particle_drawer::ParticleDrawer;
use crate::particles::particle_integration::ParticleIntegration;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::shader_binary::ShaderBinary;

/// A particle field whose buffers, bind groups and compute pipeline exist but
/// which cannot draw yet.
///
/// Setup is ordered by types: this value is only obtainable from
/// [`ParticleSystem::initialize_particles`], and the render pipeline can only
/// be built by consuming it.
pub struct ParticleSystem {
    config: FieldConfig,
    particle_buffers: ParticleBuffers,
    integration: ParticleIntegration,
    bind_groups: BindGroupSet,
}

impl ParticleSystem {
    /// Allocates particle state and builds the compute pipeline and both bind groups.
    ///
    /// Configuration, device limits and seed data are checked before anything is allocated.
    ///
    /// The dispatch covers `ceil(particle_count / config.workgroup_size)`
    /// workgroups. `workgroup_size` must equal the workgroup size compiled into
    /// `compute_shader`, nothing here can read it back from the binary.
    pub async fn initialize_particles(
        wgpu_context: &WgpuContext,
        config: &FieldConfig,
        seed: &ParticleSeed,
        compute_shader: &[u8],
    ) -> Result<Self, SetupError> {
        config.validate()?;
        Self::check_device_limits(wgpu_context, config)?;
        seed.validate(config.particle_count)?;
        let compute_shader = ShaderBinary::from_bytes(compute_shader)?;

        let particle_buffers = ParticleBuffers::allocate(wgpu_context, config.particle_count, seed)?;
        let integration = ParticleIntegration::new(
            wgpu_context,
            &compute_shader,
            &config.compute_entry_point,
            config.workgroup_size,
        ).await?;
        let bind_groups = BindGroupSet::new(wgpu_context, integration.bind_group_layout(), &particle_buffers);

        Ok(Self {
            config: config.clone(),
            particle_buffers,
            integration,
            bind_groups,
        })
    }

    /// Builds the render pipeline and hands every GPU object over to the frame loop.
    pub async fn initialize_render_pipeline(
        self,
        wgpu_context: &WgpuContext,
        vertex_shader: &[u8],
        fragment_shader: &[u8],
        color_target_format: wgpu::TextureFormat,
        canvas_size: Vec2,
    ) -> Result<FrameLoop, SetupError> {
        let vertex_shader = ShaderBinary::from_bytes(vertex_shader)?;
        let fragment_shader = ShaderBinary::from_bytes(fragment_shader)?;

        let drawer = ParticleDrawer::new(
            wgpu_context,
            &vertex_shader,
            &fragment_shader,
            color_target_format,
            canvas_size,
            self.config.particle_size,
        ).await?;

        FrameLoop::new(
            wgpu_context,
            self.particle_buffers,
            self.bind_groups,
            self.integration,
            drawer,
            self.config.clear_color,
            self.config.profile_gpu,
        )
    }

    pub fn particle_buffers(&self) -> &ParticleBuffers {
        &self.particle_buffers
    }

    fn check_device_limits(wgpu_context: &WgpuContext, config: &FieldConfig) -> Result<(), SetupError> {
        let limits = wgpu_context.get_device().limits();

        let pair_bytes = BufferSizes::for_count(config.particle_count).position;
        let storage_limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if pair_bytes > storage_limit {
            return Err(SetupError::BufferTooLarge { bytes: pair_bytes, limit: storage_limit });
        }

        let workgroups = config.workgroup_count();
        if workgroups > limits.max_compute_workgroups_per_dimension {
            return Err(SetupError::DispatchTooLarge {
                workgroups,
                limit: limits.max_compute_workgroups_per_dimension,
            });
        }
        Ok(())
    }
}
