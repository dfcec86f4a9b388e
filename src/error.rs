use thiserror::Error;
use crate::particles::PairId;

/// Reasons the GPU environment could not be acquired.
///
/// These are expected on machines without GPU support, so `Display` gives a
/// message that can be shown to the user as-is.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("WebGPU is not supported. Enable chrome://flags/#enable-unsafe-webgpu flag.")]
    NotSupported,
    #[error("Failed to get GPU adapter. not supported ({0})")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("The GPU adapter cannot present to this window")]
    IncompatibleSurface,
    #[error("Failed to create the rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("Failed to acquire the GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Errors raised while building buffers, bind groups and pipelines.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("particle count must be greater than zero")]
    EmptyParticleField,
    #[error("workgroup size must be greater than zero")]
    EmptyWorkgroup,
    #[error("{field} holds {actual} values but {expected} were expected")]
    SeedLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("simulation parameters are empty")]
    EmptySimParams,
    #[error("shader binary is empty")]
    EmptyShaderBinary,
    #[error("shader binary is {len} bytes long, which is not a multiple of 4")]
    MisalignedShaderBinary { len: usize },
    #[error("a particle pair buffer needs {bytes} bytes but the device allows {limit}")]
    BufferTooLarge { bytes: u64, limit: u64 },
    #[error("{workgroups} workgroups are needed but the device allows {limit} per dimension")]
    DispatchTooLarge { workgroups: u32, limit: u32 },
    #[error("failed to create gpu profiler: {0:?}")]
    Profiler(wgpu_profiler::CreationError),
    #[error("graphics backend error: {0}")]
    Backend(wgpu::Error),
}

/// Errors raised when copying particle state back to the CPU.
#[derive(Debug, Error)]
pub enum ReadbackError {
    #[error("pair {0:?} has not been written yet")]
    UnwrittenPair(PairId),
    #[error("failed to map staging buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("failed to poll device: {0:?}")]
    Poll(wgpu::PollError),
    #[error("mapping callback was dropped before completing")]
    Disconnected,
}
