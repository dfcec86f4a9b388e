use crate::error::SetupError;
use crate::renderer::wgpu_context::WgpuContext;

pub mod gpu_buffer;
pub mod compute_shader;
pub mod shader_binary;
pub mod render_timer;
pub mod input_manager;

/// Closes the validation error scope opened before creating GPU objects.
///
/// The backend error is handed back untouched, it is never parsed here.
pub async fn pop_backend_error(wgpu_context: &WgpuContext) -> Result<(), SetupError> {
    match wgpu_context.get_device().pop_error_scope().await {
        Some(error) => Err(SetupError::Backend(error)),
        None => Ok(()),
    }
}
