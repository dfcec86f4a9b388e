use glam::{Vec2, Vec4};
use crate::error::SetupError;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::gpu_buffer::GpuBuffer;

/// Unit quad in [-1, 1]², drawn as a 4 vertex triangle strip.
pub const QUAD_VERTICES: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// Color channels per particle, one byte each.
pub type ParticleColor = [u8; 4];

/// Names one of the two position/velocity buffer pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PairId {
    A,
    B,
}

impl PairId {
    pub fn other(self) -> Self {
        match self {
            PairId::A => PairId::B,
            PairId::B => PairId::A,
        }
    }
}

pub struct BufferPair {
    pub positions: GpuBuffer<Vec4>,
    pub velocities: GpuBuffer<Vec4>,
}

/// Initial particle data supplied by the host, in flat arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSeed {
    /// Copied verbatim into the compute uniform.
    pub sim_params: Vec<f32>,
    /// 4 floats per particle: x, y, z, w.
    pub positions: Vec<f32>,
    /// 2 floats per particle: vx, vy.
    pub velocities: Vec<f32>,
    /// 4 bytes per particle: r, g, b, a.
    pub colors: Vec<u8>,
}

impl ParticleSeed {
    pub fn validate(&self, particle_count: u32) -> Result<(), SetupError> {
        let count = particle_count as usize;
        if count == 0 {
            return Err(SetupError::EmptyParticleField);
        }
        if self.sim_params.is_empty() {
            return Err(SetupError::EmptySimParams);
        }
        check_length("positions", self.positions.len(), 4 * count)?;
        check_length("velocities", self.velocities.len(), 2 * count)?;
        check_length("colors", self.colors.len(), 4 * count)?;
        Ok(())
    }
}

fn check_length(field: &'static str, actual: usize, expected: usize) -> Result<(), SetupError> {
    if actual != expected {
        return Err(SetupError::SeedLength { field, expected, actual });
    }
    Ok(())
}

/// Byte sizes of every particle buffer for a given particle count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BufferSizes {
    pub position: u64,
    pub velocity: u64,
    pub color: u64,
    pub quad: u64,
}

impl BufferSizes {
    pub fn for_count(particle_count: u32) -> Self {
        let count = particle_count as usize;
        Self {
            position: GpuBuffer::<Vec4>::bytes_for(count),
            velocity: GpuBuffer::<Vec4>::bytes_for(count),
            color: GpuBuffer::<ParticleColor>::bytes_for(count),
            quad: GpuBuffer::<Vec2>::bytes_for(QUAD_VERTICES.len()),
        }
    }
}

/// Every GPU buffer of the particle field.
///
/// Pair A holds the seed data, pair B is left unwritten until the first
/// compute dispatch fills it.
pub struct ParticleBuffers {
    pair_a: BufferPair,
    pair_b: BufferPair,
    colors: GpuBuffer<ParticleColor>,
    quad: GpuBuffer<Vec2>,
    sim_params: GpuBuffer<f32>,
    particle_count: u32,
}

impl ParticleBuffers {
    pub fn allocate(wgpu_context: &WgpuContext, particle_count: u32, seed: &ParticleSeed) -> Result<Self, SetupError> {
        seed.validate(particle_count)?;
        let count = particle_count as usize;
        let pair_usage = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE;

        let pair_a = BufferPair {
            positions: GpuBuffer::new(wgpu_context, "Position buffer A", &pack_positions(&seed.positions), pair_usage),
            velocities: GpuBuffer::new(wgpu_context, "Velocity buffer A", &expand_velocities(&seed.velocities), pair_usage),
        };
        let pair_b = BufferPair {
            positions: GpuBuffer::uninitialized(wgpu_context, "Position buffer B", count, pair_usage),
            velocities: GpuBuffer::uninitialized(wgpu_context, "Velocity buffer B", count, pair_usage),
        };

        let colors = GpuBuffer::new(wgpu_context, "Color buffer", &pack_colors(&seed.colors), wgpu::BufferUsages::VERTEX);
        let quad = GpuBuffer::new(wgpu_context, "Quad buffer", &QUAD_VERTICES, wgpu::BufferUsages::VERTEX);
        let sim_params = GpuBuffer::new(wgpu_context, "Compute uniform buffer", &pad_uniform(&seed.sim_params), wgpu::BufferUsages::UNIFORM);

        let sizes = BufferSizes::for_count(particle_count);
        log::info!(
            "Allocated {} particles: 2 x {} B position, 2 x {} B velocity, {} B color, {} B quad",
            particle_count, sizes.position, sizes.velocity, sizes.color, sizes.quad
        );

        Ok(Self {
            pair_a,
            pair_b,
            colors,
            quad,
            sim_params,
            particle_count,
        })
    }

    pub fn pair(&self, id: PairId) -> &BufferPair {
        match id {
            PairId::A => &self.pair_a,
            PairId::B => &self.pair_b,
        }
    }

    pub fn colors(&self) -> &GpuBuffer<ParticleColor> {
        &self.colors
    }

    pub fn quad(&self) -> &GpuBuffer<Vec2> {
        &self.quad
    }

    pub fn sim_params(&self) -> &GpuBuffer<f32> {
        &self.sim_params
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }
}

pub fn pack_positions(positions: &[f32]) -> Vec<Vec4> {
    positions.chunks_exact(4).map(Vec4::from_slice).collect()
}

/// Widens `[vx, vy]` pairs to the 16 byte storage stride as `[vx, vy, 0, 1]`.
pub fn expand_velocities(velocities: &[f32]) -> Vec<Vec4> {
    velocities
        .chunks_exact(2)
        .map(|velocity| Vec4::new(velocity[0], velocity[1], 0.0, 1.0))
        .collect()
}

pub fn pack_colors(colors: &[u8]) -> Vec<ParticleColor> {
    colors
        .chunks_exact(4)
        .map(|color| [color[0], color[1], color[2], color[3]])
        .collect()
}

/// Zero-pads uniform data up to the 16 byte granularity of uniform blocks.
pub fn pad_uniform(params: &[f32]) -> Vec<f32> {
    let mut padded = params.to_vec();
    padded.resize(params.len().next_multiple_of(4), 0.0);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(count: usize) -> ParticleSeed {
        ParticleSeed {
            sim_params: vec![1.0, 0.0],
            positions: vec![0.0; 4 * count],
            velocities: vec![0.0; 2 * count],
            colors: vec![255; 4 * count],
        }
    }

    #[test]
    fn buffer_sizes_follow_particle_count() {
        for count in [1, 4, 1000, 50_000] {
            let sizes = BufferSizes::for_count(count);
            assert_eq!(sizes.position, 16 * count as u64);
            assert_eq!(sizes.velocity, 16 * count as u64);
            assert_eq!(sizes.color, 4 * count as u64);
            assert_eq!(sizes.quad, 32);
        }
    }

    #[test]
    fn velocities_are_widened_without_loss() {
        let velocities = [1.5, -2.0, 0.25, 3.0e-7, -0.0, f32::MAX];
        let expanded = expand_velocities(&velocities);

        assert_eq!(expanded.len(), 3);
        for (stored, input) in expanded.iter().zip(velocities.chunks_exact(2)) {
            assert_eq!(stored.x.to_bits(), input[0].to_bits());
            assert_eq!(stored.y.to_bits(), input[1].to_bits());
            assert_eq!(stored.z, 0.0);
            assert_eq!(stored.w, 1.0);
        }
    }

    #[test]
    fn positions_and_colors_are_grouped_per_particle() {
        let positions = pack_positions(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(positions, vec![Vec4::new(0.0, 1.0, 2.0, 3.0), Vec4::new(4.0, 5.0, 6.0, 7.0)]);

        let colors = pack_colors(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(colors, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
    }

    #[test]
    fn uniform_data_is_padded_to_whole_vectors() {
        assert_eq!(pad_uniform(&[1.0]), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(pad_uniform(&[1.0, 2.0, 3.0, 4.0]), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(pad_uniform(&[1.0; 5]).len(), 8);
    }

    #[test]
    fn seed_lengths_are_checked() {
        assert!(seed(3).validate(3).is_ok());
        assert!(matches!(seed(3).validate(0), Err(SetupError::EmptyParticleField)));

        let mut short_positions = seed(3);
        short_positions.positions.pop();
        assert!(matches!(
            short_positions.validate(3),
            Err(SetupError::SeedLength { field: "positions", expected: 12, actual: 11 })
        ));

        let mut long_colors = seed(3);
        long_colors.colors.push(0);
        assert!(matches!(
            long_colors.validate(3),
            Err(SetupError::SeedLength { field: "colors", expected: 12, actual: 13 })
        ));

        let mut no_params = seed(3);
        no_params.sim_params.clear();
        assert!(matches!(no_params.validate(3), Err(SetupError::EmptySimParams)));
    }

    #[test]
    fn pair_ids_alternate() {
        assert_eq!(PairId::A.other(), PairId::B);
        assert_eq!(PairId::B.other(), PairId::A);
        assert_eq!(PairId::A.other().other(), PairId::A);
    }
}
