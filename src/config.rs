use crate::error::SetupError;

/// Number of particles the demo seeds.
pub const NUM_PARTICLES: u32 = 50_000;
/// Particle size in pixels.
pub const PARTICLE_SIZE: f32 = 2.0;
/// `@workgroup_size` of the bundled compute shader.
pub const WORKGROUP_SIZE: u32 = 64;
pub const COMPUTE_ENTRY_POINT: &str = "cs_particle";

/// Settings fixed for the lifetime of a particle field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub particle_count: u32,
    pub particle_size: f32,
    /// Invocations per workgroup declared by the compute shader binary.
    ///
    /// The binary is opaque, so this value is trusted as given. A value larger
    /// than the shader's real workgroup size leaves the tail of the field
    /// unintegrated: 64 here against a shader built with a workgroup size of 1
    /// moves only 782 of 50 000 particles. Use 1 when the shader is not under
    /// the caller's control and was written for one invocation per particle.
    pub workgroup_size: u32,
    pub compute_entry_point: String,
    pub clear_color: wgpu::Color,
    pub profile_gpu: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: NUM_PARTICLES,
            particle_size: PARTICLE_SIZE,
            workgroup_size: WORKGROUP_SIZE,
            compute_entry_point: COMPUTE_ENTRY_POINT.to_string(),
            clear_color: wgpu::Color::BLACK,
            profile_gpu: false,
        }
    }
}

impl FieldConfig {
    pub fn with_particle_count(mut self, particle_count: u32) -> Self {
        self.particle_count = particle_count;
        self
    }

    /// Checks the settings that do not depend on the device.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.particle_count == 0 {
            return Err(SetupError::EmptyParticleField);
        }
        if self.workgroup_size == 0 {
            return Err(SetupError::EmptyWorkgroup);
        }
        Ok(())
    }

    /// Workgroups needed to cover one invocation per particle.
    pub fn workgroup_count(&self) -> u32 {
        self.particle_count.div_ceil(self.workgroup_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FieldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 50_000);
        assert_eq!(config.clear_color, wgpu::Color::BLACK);
    }

    #[test]
    fn zero_particles_is_rejected() {
        let config = FieldConfig::default().with_particle_count(0);
        assert!(matches!(config.validate(), Err(SetupError::EmptyParticleField)));
    }

    #[test]
    fn zero_workgroup_is_rejected() {
        let config = FieldConfig { workgroup_size: 0, ..FieldConfig::default() };
        assert!(matches!(config.validate(), Err(SetupError::EmptyWorkgroup)));
    }

    #[test]
    fn workgroups_cover_every_particle() {
        let config = FieldConfig::default();
        assert_eq!(config.workgroup_count(), 782);

        let exact = FieldConfig { workgroup_size: 1, ..FieldConfig::default() };
        assert_eq!(exact.workgroup_count(), 50_000);

        let single = FieldConfig::default().with_particle_count(1);
        assert_eq!(single.workgroup_count(), 1);
    }
}
