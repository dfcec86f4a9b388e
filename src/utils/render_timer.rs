use std::time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Counts presented frames and reports the rate once per interval.
pub struct RenderTimer {
    last_report: Instant,
    frames: u32,
}

impl RenderTimer {
    pub fn new() -> Self {
        Self {
            last_report: Instant::now(),
            frames: 0,
        }
    }

    /// Records a frame, returns the frames per second when an interval has elapsed.
    pub fn frame(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed < REPORT_INTERVAL {
            return None;
        }

        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.last_report = Instant::now();
        Some(fps)
    }
}

impl Default for RenderTimer {
    fn default() -> Self {
        Self::new()
    }
}
