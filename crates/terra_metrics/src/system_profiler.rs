//! Per-system timing, keyed by the name the system was registered under

use std::time::{Duration, Instant};

/// Accumulated timing for one named system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemTiming {
    pub last: Duration,
    pub total: Duration,
    pub calls: u64,
}

/// Systems are kept in first-seen order so reports follow the update order.
#[derive(Debug, Default)]
pub struct SystemProfiler {
    entries: Vec<(String, SystemTiming)>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_system<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), SystemTiming::default()));
                self.entries.len() - 1
            }
        };
        let timing = &mut self.entries[index].1;
        timing.last = elapsed;
        timing.total += elapsed;
        timing.calls += 1;

        result
    }

    pub fn timing(&self, name: &str) -> Option<SystemTiming> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, timing)| *timing)
    }

    pub fn report(&self) -> Vec<(String, SystemTiming)> {
        self.entries.clone()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
