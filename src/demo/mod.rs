//! Host side of the demo: seed data and bundled shaders.

pub mod seed;
pub mod shaders;

pub use seed::random_seed;
pub use shaders::ShaderBlobs;
