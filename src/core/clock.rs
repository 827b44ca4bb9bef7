use std::time::Instant;

/// Minimal frame clock - just tracks delta time
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Reset clock to current time
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages frame rate over a fixed window
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: f32,
    frame_count: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    /// `interval` is the averaging window in seconds
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            frame_count: 0,
            elapsed: 0.0,
            fps: 0.0,
        }
    }

    /// Counts one frame; returns the new average when a window closes
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frame_count += 1;
        self.elapsed += delta;

        if self.elapsed < self.interval {
            return None;
        }

        self.fps = self.frame_count as f32 / self.elapsed;
        self.frame_count = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }

    /// Average from the last completed window, 0 before the first
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
