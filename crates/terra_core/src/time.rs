//! Simulation clock
//!
//! Fixed 60Hz frame rate by default; callers may advance by any delta.

use std::time::Duration;

/// Default simulation rate (60 Hz = 16.666ms per frame)
pub const TICK_RATE_HZ: u32 = 60;
pub const TICK_DURATION: Duration = Duration::from_micros(16_666); // ~16.666ms

/// Frame counter and elapsed simulated time
#[derive(Debug, Clone, Default)]
pub struct SimulationTime {
    frame: u64,
    elapsed: Duration,
    last_delta: Duration,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance one fixed tick and return its length in seconds.
    pub fn advance_tick(&mut self) -> f32 {
        self.advance(TICK_DURATION)
    }

    pub fn advance(&mut self, delta: Duration) -> f32 {
        self.frame += 1;
        self.elapsed += delta;
        self.last_delta = delta;
        delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }
}
