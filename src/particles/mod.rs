pub mod particle_system;
pub mod particle_buffers;
pub mod particle_bind_groups;
pub mod particle_integration;
pub mod particle_drawer;
pub mod frame_loop;

pub use frame_loop::{FrameLoop, StopHandle};
pub use particle_buffers::{PairId, ParticleSeed};
pub use particle_system::ParticleSystem;
