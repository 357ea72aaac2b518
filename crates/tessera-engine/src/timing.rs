//! Frame timing for the demo loop.
//!
//! Simulation time advances in fixed steps so slides play out identically on
//! every run; wall-clock work per frame is sampled for reporting only.

use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-step simulation clock with frame-time averaging.
#[derive(Debug)]
pub struct FrameTiming {
    /// Fixed timestep in seconds
    fixed_dt: f32,
    /// Accumulator for fixed timestep
    accumulator: f32,
    /// Simulated seconds since start
    elapsed: f64,
    /// Frames completed
    frames: u64,
    /// Recent frame work times in seconds
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameTiming {
    /// Create a clock stepping at `target_fps`.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            fixed_dt: 1.0 / target_fps as f32,
            accumulator: 0.0,
            elapsed: 0.0,
            frames: 0,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Simulated seconds since start.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames completed.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Accumulate time for fixed timestep updates.
    /// Returns the number of fixed updates that should be performed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        // Limit to prevent spiral of death
        let max_updates = 10;
        while self.accumulator >= self.fixed_dt && count < max_updates {
            self.accumulator -= self.fixed_dt;
            self.elapsed += f64::from(self.fixed_dt);
            count += 1;
        }

        // If we're still behind, reset accumulator
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Records the wall-clock work of one frame.
    pub fn record_frame(&mut self, work: Duration) {
        self.frames += 1;
        self.frame_times.push_back(work.as_secs_f32());
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
    }

    /// Get the average frame work time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }
}
