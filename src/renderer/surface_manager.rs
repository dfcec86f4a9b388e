use std::sync::Arc;
use wgpu::Adapter;
use winit::dpi;
use winit::window::Window;
use crate::error::DeviceError;

pub struct SurfaceManager {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    is_surface_configured: bool,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceManager {
    pub fn new(window: Arc<Window>, surface: wgpu::Surface<'static>, adapter: &Adapter) -> Result<Self, DeviceError> {
        let (surface_format, alpha_mode) = Self::choose_formats(&surface.get_capabilities(adapter))?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        Ok(Self { window, surface, is_surface_configured: false, config })
    }

    /// Picks an sRGB format and premultiplied alpha when offered, else the first of each.
    ///
    /// Empty lists mean the adapter cannot present to this surface at all.
    pub fn choose_formats(
        surface_caps: &wgpu::SurfaceCapabilities,
    ) -> Result<(wgpu::TextureFormat, wgpu::CompositeAlphaMode), DeviceError> {
        let surface_format = surface_caps.formats.iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or(DeviceError::IncompatibleSurface)?;

        // Particles are blended with premultiplied alpha, prefer a matching compositor mode
        let alpha_mode = surface_caps.alpha_modes.iter()
            .find(|mode| **mode == wgpu::CompositeAlphaMode::PreMultiplied)
            .or(surface_caps.alpha_modes.first())
            .copied()
            .ok_or(DeviceError::IncompatibleSurface)?;

        Ok((surface_format, alpha_mode))
    }

    pub fn window_size(&self) -> dpi::PhysicalSize<u32> {
        self.window.inner_size()
    }

    pub fn resize(&mut self, width: u32, height: u32, device: &wgpu::Device) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(device, &self.config);
            self.is_surface_configured = true;
        }
    }

    pub fn get_window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn get_surface(&self) -> &wgpu::Surface<'static> {
        &self.surface
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }

    pub fn get_config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }
}
