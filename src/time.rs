//! Frame timing.

use std::time::Instant;

/// Timing information for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GameTime {
    /// Seconds since the clock started.
    pub total: f32,
    /// Seconds since the previous frame.
    pub elapsed: f32,
}

impl GameTime {
    pub fn new(total: f32, elapsed: f32) -> Self {
        Self { total, elapsed }
    }

    /// A single frame of `elapsed` seconds starting at zero. Handy in tests.
    pub fn from_elapsed(elapsed: f32) -> Self {
        Self {
            total: elapsed,
            elapsed,
        }
    }
}

/// Wall-clock source of [`GameTime`].
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Advance to the next frame.
    pub fn tick(&mut self) -> GameTime {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        GameTime {
            total: now.duration_since(self.start).as_secs_f32(),
            elapsed,
        }
    }

    /// Restart from zero. The first tick after a reset reports no elapsed time.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_tick = now;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames per second, averaged over one-second windows.
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    window: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame. Returns the new rate each time a full second has
    /// accumulated.
    pub fn record(&mut self, time: &GameTime) -> Option<f32> {
        self.frames += 1;
        self.window += time.elapsed;
        if self.window < 1.0 {
            return None;
        }

        self.fps = self.frames as f32 / self.window;
        self.frames = 0;
        self.window = 0.0;
        Some(self.fps)
    }

    /// Rate from the last completed window, zero before the first one.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
