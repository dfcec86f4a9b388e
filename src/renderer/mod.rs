pub mod wgpu_context;
pub mod surface_manager;
