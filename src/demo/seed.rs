use rand::Rng;
use crate::particles::ParticleSeed;

/// Largest initial speed along each axis, in clip space units per tick.
const MAX_SPEED: f32 = 0.002;
/// `[delta_time, bounds, 0, 0]` for the bundled compute shader.
pub const DEMO_SIM_PARAMS: [f32; 4] = [1.0, 1.0, 0.0, 0.0];

/// Scatters `particle_count` particles over the whole canvas with small random velocities.
pub fn random_seed(particle_count: u32) -> ParticleSeed {
    let mut rng = rand::rng();
    let count = particle_count as usize;

    let mut positions: Vec<f32> = Vec::with_capacity(4 * count);
    let mut velocities: Vec<f32> = Vec::with_capacity(2 * count);
    let mut colors: Vec<u8> = Vec::with_capacity(4 * count);

    for _ in 0..count {
        positions.extend_from_slice(&[rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0), 0.0, 1.0]);
        velocities.extend_from_slice(&[
            rng.random_range(-MAX_SPEED..MAX_SPEED),
            rng.random_range(-MAX_SPEED..MAX_SPEED),
        ]);
        colors.extend_from_slice(&[
            rng.random_range(64..=255),
            rng.random_range(64..=255),
            rng.random_range(64..=255),
            255,
        ]);
    }

    ParticleSeed {
        sim_params: DEMO_SIM_PARAMS.to_vec(),
        positions,
        velocities,
        colors,
    }
}
