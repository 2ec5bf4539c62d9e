//! Frame timing utilities

use std::time::{Duration, Instant};

/// Counts render ticks and measures the time spent between them
#[derive(Debug)]
pub struct FrameClock {
    started: Instant,
    last_tick: Instant,
    delta: Duration,
    tick_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
            delta: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Advance the clock by one tick (call once per frame)
    pub fn advance(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.tick_count += 1;
    }

    /// Time between the two most recent ticks
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Number of ticks since creation
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Average ticks per second since creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_tick_rate(&self) -> f32 {
        let elapsed = self.last_tick.duration_since(self.started).as_secs_f32();
        if elapsed > 0.0 {
            self.tick_count as f32 / elapsed
        } else {
            0.0
        }
    }
}
