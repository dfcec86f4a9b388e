use std::sync::Arc;
use anyhow::Context;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;
use crate::config::FieldConfig;
use crate::demo::{random_seed, ShaderBlobs};
use crate::particles::{FrameLoop, ParticleSystem, StopHandle};
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::input_manager::InputManager;
#[cfg(not(target_arch = "wasm32"))]
use crate::utils::render_timer::RenderTimer;

// Everything the window needs to drive the particle field
pub struct State {
    wgpu_context: WgpuContext,
    frame_loop: FrameLoop,
    stop_handle: StopHandle,
    input_manager: InputManager,
    #[cfg(not(target_arch = "wasm32"))]
    render_timer: RenderTimer,
}

impl State {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let mut wgpu_context = WgpuContext::create_device(window).await?;
        let size = wgpu_context.window_size();
        wgpu_context.resize(size.x as u32, size.y as u32);

        let config = FieldConfig::default();
        let seed = random_seed(config.particle_count);
        let shaders = ShaderBlobs::compile()?;
        let format = wgpu_context
            .get_surface_config()
            .map(|surface_config| surface_config.format)
            .context("Window has no surface to draw on")?;

        let particle_system = ParticleSystem::initialize_particles(
            &wgpu_context,
            &config,
            &seed,
            &shaders.compute,
        ).await?;
        let mut frame_loop = particle_system.initialize_render_pipeline(
            &wgpu_context,
            &shaders.vertex,
            &shaders.fragment,
            format,
            size,
        ).await?;
        let stop_handle = frame_loop.start();

        Ok(Self {
            wgpu_context,
            frame_loop,
            stop_handle,
            input_manager: InputManager::new(),
            #[cfg(not(target_arch = "wasm32"))]
            render_timer: RenderTimer::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.wgpu_context.resize(width, height);
        self.frame_loop.resize(&self.wgpu_context, width, height);
    }

    pub fn request_redraw(&self) {
        if let Some(window) = self.wgpu_context.get_window() {
            window.request_redraw();
        }
    }

    pub fn window_size(&self) -> (u32, u32) {
        let size = self.wgpu_context.window_size();
        (size.x as u32, size.y as u32)
    }

    pub fn render_loop(&mut self, event: &WindowEvent, event_loop: &ActiveEventLoop) {
        match event {
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                if !self.frame_loop.is_running() {
                    event_loop.exit();
                    return;
                }
                match self.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let (width, height) = self.window_size();
                        self.resize(width, height);
                    }
                    Err(e) => {
                        log::error!("Unable to render: {:?}", e);
                        self.stop_handle.stop();
                    }
                }
                self.request_redraw();
            }
            _ => {
                if self.input_manager.manage_input(event, &self.stop_handle) {
                    log::info!("Stopping after {} frames", self.frame_loop.frames());
                    event_loop.exit();
                }
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.wgpu_context.is_surface_configured() {
            return Ok(());
        }
        let Some(surface) = self.wgpu_context.get_surface() else {
            return Ok(());
        };

        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.frame_loop.tick(&self.wgpu_context, &view);
        output.present();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(fps) = self.render_timer.frame() {
            log::info!("{:.1} fps", fps);
        }
        Ok(())
    }
}
