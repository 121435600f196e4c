//! Frame timing over a rolling window

use super::rolling_window::RollingWindow;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct FrameTimer {
    started: Option<Instant>,
    window: RollingWindow<Duration>,
    frames: u64,
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        Self {
            started: None,
            window: RollingWindow::new(window),
            frames: 0,
        }
    }

    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Close the frame opened by `begin`. Unpaired calls are ignored.
    pub fn end(&mut self) {
        if let Some(started) = self.started.take() {
            self.window.push(started.elapsed());
            self.frames += 1;
        }
    }

    /// Frames recorded since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f64 {
        let mean = self.window.mean().as_secs_f64();
        if mean > 0.0 {
            1.0 / mean
        } else {
            0.0
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.window.mean().as_secs_f64() * 1000.0
    }

    pub fn worst_frame_ms(&self) -> f64 {
        self.window.max().as_secs_f64() * 1000.0
    }
}
