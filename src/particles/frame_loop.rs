use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use glam::{Vec2, Vec4};
use wgpu_profiler::{GpuProfiler, GpuProfilerSettings};
use crate::error::{ReadbackError, SetupError};
use crate::particles::particle_bind_groups::{BindGroupSet, ComputeDirection};
use crate::particles::particle_buffers::{PairId, ParticleBuffers, ParticleColor};
use crate::particles::particle_drawer::ParticleDrawer;
use crate::particles::particle_integration::ParticleIntegration;
use crate::renderer::wgpu_context::WgpuContext;

/// The pair the next tick computes into and then draws from.
///
/// The loop starts with B current, so the first dispatch reads the seeded
/// pair A.
pub const INITIAL_PAIR: PairId = PairId::B;

/// Picks the compute bind group for a tick: the current pair is always the output.
pub fn select_direction(current: PairId) -> ComputeDirection {
    match current {
        PairId::A => ComputeDirection::BToA,
        PairId::B => ComputeDirection::AToB,
    }
}

/// Records which pairs hold data a shader may read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WrittenPairs {
    a: bool,
    b: bool,
}

impl WrittenPairs {
    /// Only pair A holds seed data after allocation.
    pub fn seeded() -> Self {
        Self { a: true, b: false }
    }

    pub fn is_written(&self, pair: PairId) -> bool {
        match pair {
            PairId::A => self.a,
            PairId::B => self.b,
        }
    }

    pub fn mark(&mut self, pair: PairId) {
        match pair {
            PairId::A => self.a = true,
            PairId::B => self.b = true,
        }
    }
}

/// Cooperative stop request shared between the loop and its host.
#[derive(Clone, Debug)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    fn new() -> Self {
        Self { running: Arc::new(AtomicBool::new(true)) }
    }

    /// Asks the loop not to schedule another tick. Work already submitted still completes.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Owns every GPU object of the particle field after setup and runs the
/// compute-then-render sequence once per tick.
pub struct FrameLoop {
    particle_buffers: ParticleBuffers,
    bind_groups: BindGroupSet,
    integration: ParticleIntegration,
    drawer: ParticleDrawer,
    current: PairId,
    written: WrittenPairs,
    stop_handle: Option<StopHandle>,
    clear_color: wgpu::Color,
    gpu_profiler: GpuProfiler,
    frames: u64,
}

impl FrameLoop {
    pub(crate) fn new(
        wgpu_context: &WgpuContext,
        particle_buffers: ParticleBuffers,
        bind_groups: BindGroupSet,
        integration: ParticleIntegration,
        drawer: ParticleDrawer,
        clear_color: wgpu::Color,
        profile_gpu: bool,
    ) -> Result<Self, SetupError> {
        let gpu_profiler = GpuProfiler::new(
            wgpu_context.get_device(),
            GpuProfilerSettings {
                enable_timer_queries: profile_gpu,
                ..Default::default()
            },
        ).map_err(SetupError::Profiler)?;

        Ok(Self {
            particle_buffers,
            bind_groups,
            integration,
            drawer,
            current: INITIAL_PAIR,
            written: WrittenPairs::seeded(),
            stop_handle: None,
            clear_color,
            gpu_profiler,
            frames: 0,
        })
    }

    /// Marks the loop as running and hands out the handle that stops it.
    ///
    /// Starting an already running loop returns the existing handle.
    pub fn start(&mut self) -> StopHandle {
        if let Some(handle) = self.stop_handle.as_ref().filter(|handle| handle.is_running()) {
            log::warn!("Frame loop already running");
            return handle.clone();
        }

        log::info!("Starting frame loop with {} particles", self.particle_buffers.particle_count());
        let handle = StopHandle::new();
        self.stop_handle = Some(handle.clone());
        handle
    }

    /// Whether the host should schedule another tick.
    pub fn is_running(&self) -> bool {
        self.stop_handle.as_ref().is_some_and(StopHandle::is_running)
    }

    /// Encodes one integration step and one draw into a single submission.
    ///
    /// The compute pass writes the current pair, the render pass then reads
    /// that pair. Both live in the same command buffer so the draw observes the
    /// dispatch's writes.
    pub fn tick(&mut self, wgpu_context: &WgpuContext, target: &wgpu::TextureView) -> wgpu::SubmissionIndex {
        let direction = select_direction(self.current);
        assert!(
            self.written.is_written(direction.source()),
            "compute input pair {:?} has never been written",
            direction.source()
        );

        let mut encoder = wgpu_context.get_device().create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("Particle frame encoder") }
        );

        {
            let mut scope = self.gpu_profiler.scope("Particle integration pass", &mut encoder);
            self.integration.dispatch(
                &mut scope,
                self.particle_buffers.particle_count(),
                self.bind_groups.get(direction),
            );
        }
        self.written.mark(direction.target());

        {
            let mut scope = self.gpu_profiler.scope("Particle render pass", &mut encoder);
            let mut render_pass = scope.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.drawer.draw(&mut render_pass, &self.particle_buffers, direction.target());
        }

        self.gpu_profiler.resolve_queries(&mut encoder);
        let submission = wgpu_context.get_queue().submit(std::iter::once(encoder.finish()));
        self.finish_profiler_frame(wgpu_context);

        log::trace!("Frame {} computed {:?}", self.frames, direction);
        self.frames += 1;
        self.current = self.current.other();
        submission
    }

    fn finish_profiler_frame(&mut self, wgpu_context: &WgpuContext) {
        if let Err(error) = self.gpu_profiler.end_frame() {
            log::warn!("Gpu profiler frame could not be closed: {:?}", error);
            return;
        }
        let timestamp_period = wgpu_context.get_queue().get_timestamp_period();
        if let Some(results) = self.gpu_profiler.process_finished_frame(timestamp_period) {
            for result in results {
                log::trace!("{}: {:?}", result.label, result.time);
            }
        }
    }

    /// Rewrites the canvas size read by the vertex stage.
    pub fn resize(&self, wgpu_context: &WgpuContext, width: u32, height: u32) {
        self.drawer.resize(wgpu_context, Vec2::new(width as f32, height as f32));
    }

    /// The pair the next tick writes and draws.
    pub fn current_pair(&self) -> PairId {
        self.current
    }

    /// The pair holding the most recently computed state.
    pub fn latest_pair(&self) -> PairId {
        self.current.other()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn particle_buffers(&self) -> &ParticleBuffers {
        &self.particle_buffers
    }

    pub fn drawer(&self) -> &ParticleDrawer {
        &self.drawer
    }

    pub fn download_positions(&self, wgpu_context: &WgpuContext, pair: PairId) -> Result<Vec<Vec4>, ReadbackError> {
        self.ensure_written(pair)?;
        self.particle_buffers.pair(pair).positions.download(wgpu_context)
    }

    pub fn download_velocities(&self, wgpu_context: &WgpuContext, pair: PairId) -> Result<Vec<Vec4>, ReadbackError> {
        self.ensure_written(pair)?;
        self.particle_buffers.pair(pair).velocities.download(wgpu_context)
    }

    pub fn download_colors(&self, wgpu_context: &WgpuContext) -> Result<Vec<ParticleColor>, ReadbackError> {
        self.particle_buffers.colors().download(wgpu_context)
    }

    pub fn download_quad(&self, wgpu_context: &WgpuContext) -> Result<Vec<Vec2>, ReadbackError> {
        self.particle_buffers.quad().download(wgpu_context)
    }

    fn ensure_written(&self, pair: PairId) -> Result<(), ReadbackError> {
        if self.written.is_written(pair) {
            Ok(())
        } else {
            Err(ReadbackError::UnwrittenPair(pair))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_depends_only_on_current_pair() {
        assert_eq!(select_direction(PairId::A), ComputeDirection::BToA);
        assert_eq!(select_direction(PairId::B), ComputeDirection::AToB);
    }

    #[test]
    fn current_pair_is_always_the_compute_output() {
        for current in [PairId::A, PairId::B] {
            let direction = select_direction(current);
            assert_eq!(direction.target(), current);
            assert_eq!(direction.source(), current.other());
        }
    }

    #[test]
    fn flipping_twice_is_identity() {
        for pair in [PairId::A, PairId::B] {
            assert_eq!(pair.other().other(), pair);
        }
    }

    #[test]
    fn current_pair_after_k_ticks() {
        let mut current = INITIAL_PAIR;
        for k in 1..=64u32 {
            current = current.other();
            assert_eq!(current == PairId::A, k % 2 == 1, "after {} ticks", k);
        }
    }

    #[test]
    fn first_dispatch_reads_the_seeded_pair() {
        let direction = select_direction(INITIAL_PAIR);
        assert_eq!(direction, ComputeDirection::AToB);
        assert!(WrittenPairs::seeded().is_written(direction.source()));
        assert!(!WrittenPairs::seeded().is_written(direction.target()));
    }

    #[test]
    fn no_tick_ever_reads_an_unwritten_pair() {
        let mut written = WrittenPairs::seeded();
        let mut current = INITIAL_PAIR;
        for _ in 0..16 {
            let direction = select_direction(current);
            assert!(written.is_written(direction.source()));
            written.mark(direction.target());
            current = current.other();
        }
        assert!(written.is_written(PairId::A) && written.is_written(PairId::B));
    }

    #[test]
    fn stop_handle_is_shared() {
        let handle = StopHandle::new();
        let copy = handle.clone();
        assert!(copy.is_running());
        handle.stop();
        assert!(!copy.is_running());
    }
}
