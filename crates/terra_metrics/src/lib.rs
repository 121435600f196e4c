//! Terra Metrics - frame and system timing
//!
//! Instrumentation used by the entity manager and the runtime loop. All of
//! it vanishes in production builds: without the `metrics` feature every
//! type below is a zero-sized stub with the same API.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use terra_metrics::{FrameTimer, SystemProfiler};
//!
//! let mut profiler = SystemProfiler::new();
//! profiler.time_system("landscapeEvents", || { /* ... */ });
//!
//! let mut timer = FrameTimer::new(60);
//! timer.begin();
//! // ... run one frame ...
//! timer.end();
//! tracing::info!("frame time {:.2}ms", timer.frame_time_ms());
//! ```

#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod rolling_window;
#[cfg(feature = "metrics")]
mod system_profiler;

#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use rolling_window::RollingWindow;
#[cfg(feature = "metrics")]
pub use system_profiler::{SystemProfiler, SystemTiming};

#[cfg(not(feature = "metrics"))]
use std::time::Duration;

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

/// Accumulated timing for one named system.
#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemTiming {
    pub last: Duration,
    pub total: Duration,
    pub calls: u64,
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct SystemProfiler;

#[cfg(not(feature = "metrics"))]
impl SystemProfiler {
    pub fn new() -> Self {
        Self
    }
    pub fn time_system<F, R>(&mut self, _name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
    pub fn timing(&self, _name: &str) -> Option<SystemTiming> {
        None
    }
    pub fn report(&self) -> Vec<(String, SystemTiming)> {
        Vec::new()
    }
    pub fn reset(&mut self) {}
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug)]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_window: usize) -> Self {
        Self
    }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn frames(&self) -> u64 {
        0
    }
    pub fn fps(&self) -> f64 {
        0.0
    }
    pub fn frame_time_ms(&self) -> f64 {
        0.0
    }
    pub fn worst_frame_ms(&self) -> f64 {
        0.0
    }
}
