// Not every test file will use every function.
#![allow(dead_code)]

use particle_field::config::FieldConfig;
use particle_field::demo::ShaderBlobs;
use particle_field::error::SetupError;
use particle_field::particles::{FrameLoop, ParticleSeed, ParticleSystem};
use particle_field::renderer::wgpu_context::WgpuContext;

pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const TARGET_SIZE: u32 = 64;

// A struct to hold all the common objects for a test.
pub struct TestSetup {
    pub wgpu_context: WgpuContext,
    pub shaders: ShaderBlobs,
    target: wgpu::Texture,
}

impl TestSetup {
    pub fn target_view(&self) -> wgpu::TextureView {
        self.target.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Copies the offscreen target back, one `[r, g, b, a]` per pixel in row-major order.
    pub fn read_target(&self) -> Vec<[u8; 4]> {
        let device = self.wgpu_context.get_device();
        // 64 pixels x 4 bytes is already a multiple of the 256 byte row alignment
        let bytes_per_row = TARGET_SIZE * 4;
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Target readback buffer"),
            size: u64::from(bytes_per_row * TARGET_SIZE),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Target readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(TARGET_SIZE),
                },
            },
            wgpu::Extent3d {
                width: TARGET_SIZE,
                height: TARGET_SIZE,
                depth_or_array_layers: 1,
            },
        );
        let submission = self.wgpu_context.get_queue().submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, |result| result.unwrap());
        device.poll(wgpu::wgt::PollType::WaitForSubmissionIndex(submission)).unwrap();

        let pixels = buffer_slice
            .get_mapped_range()
            .chunks_exact(4)
            .map(|pixel| [pixel[0], pixel[1], pixel[2], pixel[3]])
            .collect();
        staging_buffer.unmap();
        pixels
    }

    /// The pixel under a clip space point, y up.
    pub fn pixel_at(pixels: &[[u8; 4]], clip_x: f32, clip_y: f32) -> [u8; 4] {
        let size = TARGET_SIZE as f32;
        let x = (((clip_x + 1.0) * 0.5 * size) as u32).min(TARGET_SIZE - 1);
        let y = (((1.0 - clip_y) * 0.5 * size) as u32).min(TARGET_SIZE - 1);
        pixels[(y * TARGET_SIZE + x) as usize]
    }

    /// Runs `ticks` frames and waits for the last one to finish.
    pub fn tick(&self, frame_loop: &mut FrameLoop, ticks: u32) {
        let view = self.target_view();
        for _ in 0..ticks {
            let submission = frame_loop.tick(&self.wgpu_context, &view);
            self.wgpu_context
                .get_device()
                .poll(wgpu::wgt::PollType::WaitForSubmissionIndex(submission))
                .unwrap();
        }
    }
}

// The main setup function. Returns None when the machine has no usable adapter.
pub async fn setup() -> Option<TestSetup> {
    let wgpu_context = match WgpuContext::new_for_test().await {
        Ok(wgpu_context) => wgpu_context,
        Err(e) => {
            eprintln!("Skipping GPU test: {}", e);
            return None;
        }
    };
    let shaders = ShaderBlobs::compile().unwrap();

    let target = wgpu_context.get_device().create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen target"),
        size: wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    Some(TestSetup {
        wgpu_context,
        shaders,
        target,
    })
}

pub async fn create_frame_loop(setup: &TestSetup, config: &FieldConfig, seed: &ParticleSeed) -> Result<FrameLoop, SetupError> {
    let particle_system = ParticleSystem::initialize_particles(
        &setup.wgpu_context,
        config,
        seed,
        &setup.shaders.compute,
    ).await?;

    particle_system.initialize_render_pipeline(
        &setup.wgpu_context,
        &setup.shaders.vertex,
        &setup.shaders.fragment,
        TARGET_FORMAT,
        glam::Vec2::splat(TARGET_SIZE as f32),
    ).await
}

/// Builds a seed from per-particle tuples, `sim_params` is `[dt, bounds, 0, 0]`.
pub fn seed_from(particles: &[([f32; 4], [f32; 2])], sim_params: [f32; 4]) -> ParticleSeed {
    ParticleSeed {
        sim_params: sim_params.to_vec(),
        positions: particles.iter().flat_map(|(position, _)| *position).collect(),
        velocities: particles.iter().flat_map(|(_, velocity)| *velocity).collect(),
        colors: (0..particles.len())
            .flat_map(|i| [i as u8, 128, 255 - i as u8, 255])
            .collect(),
    }
}

pub fn config_for(particle_count: usize) -> FieldConfig {
    FieldConfig::default().with_particle_count(particle_count as u32)
}
