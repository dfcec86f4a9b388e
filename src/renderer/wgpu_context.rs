use std::sync::Arc;
use glam::Vec2;
use wgpu::Adapter;
use winit::window::Window;

use crate::error::DeviceError;
use crate::renderer::surface_manager::SurfaceManager;

/// Owns the device handles every particle component borrows from.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_manager: Option<SurfaceManager>,
}

impl WgpuContext {
    /// Probes for GPU support and acquires adapter, device and the window surface.
    ///
    /// A missing GPU is an expected environment condition, so the failure is
    /// returned as a [`DeviceError`] whose message can be shown to the user.
    pub async fn create_device(window: Arc<Window>) -> Result<Self, DeviceError> {
        #[cfg(target_arch = "wasm32")]
        {
            if !wgpu::util::is_browser_webgpu_supported().await {
                return Err(DeviceError::NotSupported);
            }
        }

        // The instance is a handle to our GPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            }).await?;
        log::info!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Particle field device"),
                required_features: WgpuContext::get_optional_features(&adapter),
                required_limits: WgpuContext::get_limits(&adapter),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            }).await?;

        let surface_manager = Some(SurfaceManager::new(window, surface, &adapter)?);

        Ok(Self {
            device,
            queue,
            surface_manager,
        })
    }

    /// Headless context, used to drive the particle field without a window.
    pub async fn new_for_test() -> Result<Self, DeviceError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Test Device"),
                    required_features: WgpuContext::get_optional_features(&adapter),
                    required_limits: WgpuContext::get_limits(&adapter),
                    ..Default::default()
                },
            )
            .await?;

        Ok(Self {
            device,
            queue,
            surface_manager: None,
        })
    }

    fn get_limits(adapter: &Adapter) -> wgpu::Limits {
        if cfg!(target_arch = "wasm32") {
            // When on web, request the browser's supported limits
            wgpu::Limits::default().using_resolution(adapter.limits())
        } else {
            // For native, use the adapter's reported limits
            adapter.limits()
        }
    }

    /// Timestamp queries are only needed for profiling, request them when available.
    fn get_optional_features(adapter: &Adapter) -> wgpu::Features {
        adapter.features()
            & (wgpu::Features::TIMESTAMP_QUERY | wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS)
    }

    pub fn window_size(&self) -> Vec2 {
        match &self.surface_manager {
            Some(surface_manager) => {
                let size = surface_manager.window_size();
                Vec2::new(size.width as f32, size.height as f32)
            }
            None => Vec2::ZERO,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface_manager) = self.surface_manager.as_mut() {
            surface_manager.resize(width, height, &self.device);
        }
    }

    pub fn get_window(&self) -> Option<&Arc<Window>> {
        self.surface_manager.as_ref().map(SurfaceManager::get_window)
    }

    pub fn get_surface(&self) -> Option<&wgpu::Surface<'static>> {
        self.surface_manager.as_ref().map(SurfaceManager::get_surface)
    }

    pub fn is_surface_configured(&self) -> bool {
        self.surface_manager.as_ref().is_some_and(SurfaceManager::is_surface_configured)
    }

    pub fn get_device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn get_queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn get_surface_config(&self) -> Option<&wgpu::SurfaceConfiguration> {
        self.surface_manager.as_ref().map(SurfaceManager::get_config)
    }
}
