use particle_field::config::FieldConfig;
use particle_field::demo::random_seed;
use particle_field::error::SetupError;
use particle_field::particles::particle_buffers::BufferSizes;
use particle_field::particles::{PairId, ParticleSystem};

mod common;

#[test]
fn buffers_are_sized_from_the_particle_count() {
    let Some(setup) = pollster::block_on(common::setup()) else { return };
    let config = common::config_for(1000);
    let seed = random_seed(1000);
    let particle_system = pollster::block_on(ParticleSystem::initialize_particles(
        &setup.wgpu_context,
        &config,
        &seed,
        &setup.shaders.compute,
    )).unwrap();

    let buffers = particle_system.particle_buffers();
    let sizes = BufferSizes::for_count(1000);
    for pair in [PairId::A, PairId::B] {
        assert_eq!(buffers.pair(pair).positions.size_bytes(), sizes.position);
        assert_eq!(buffers.pair(pair).velocities.size_bytes(), sizes.velocity);
    }
    assert_eq!(buffers.colors().size_bytes(), 4000);
    assert_eq!(buffers.quad().size_bytes(), 32);
    assert_eq!(buffers.sim_params().size_bytes(), 16);
    assert_eq!(buffers.particle_count(), 1000);
}

#[test]
fn zero_particles_are_rejected() {
    let Some(setup) = pollster::block_on(common::setup()) else { return };
    let seed = common::seed_from(&[], [1.0, 0.0, 0.0, 0.0]);
    let result = pollster::block_on(common::create_frame_loop(&setup, &common::config_for(0), &seed));
    assert!(matches!(result, Err(SetupError::EmptyParticleField)));
}

#[test]
fn seed_length_mismatch_is_rejected() {
    let Some(setup) = pollster::block_on(common::setup()) else { return };
    let mut seed = random_seed(8);
    seed.velocities.truncate(15);
    let result = pollster::block_on(common::create_frame_loop(&setup, &common::config_for(8), &seed));
    assert!(matches!(
        result,
        Err(SetupError::SeedLength { field: "velocities", expected: 16, actual: 15 })
    ));
}

#[test]
fn misaligned_shader_binary_is_rejected() {
    let Some(setup) = pollster::block_on(common::setup()) else { return };
    let seed = random_seed(4);
    let mut compute = setup.shaders.compute.clone();
    compute.pop();

    let result = pollster::block_on(ParticleSystem::initialize_particles(
        &setup.wgpu_context,
        &common::config_for(4),
        &seed,
        &compute,
    ));
    assert!(matches!(result, Err(SetupError::MisalignedShaderBinary { .. })));
}

#[test]
fn unknown_entry_point_is_a_backend_error() {
    let Some(setup) = pollster::block_on(common::setup()) else { return };
    let seed = random_seed(4);
    let config = FieldConfig {
        compute_entry_point: "missing_entry".to_string(),
        ..common::config_for(4)
    };

    let result = pollster::block_on(ParticleSystem::initialize_particles(
        &setup.wgpu_context,
        &config,
        &seed,
        &setup.shaders.compute,
    ));
    assert!(matches!(result, Err(SetupError::Backend(_))));
}

#[test]
fn oversized_field_is_rejected_before_allocation() {
    let Some(setup) = pollster::block_on(common::setup()) else { return };
    let limits = setup.wgpu_context.get_device().limits();
    let storage_limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
    let too_many = storage_limit / 16 + 1;
    if too_many > u64::from(u32::MAX) {
        return;
    }

    // The limit check runs before the seed is looked at
    let config = common::config_for(too_many as usize);
    let seed = common::seed_from(&[], [1.0, 0.0, 0.0, 0.0]);
    let result = pollster::block_on(ParticleSystem::initialize_particles(
        &setup.wgpu_context,
        &config,
        &seed,
        &setup.shaders.compute,
    ));
    assert!(matches!(result, Err(SetupError::BufferTooLarge { .. })));
}
