//! Fixed-size window of the most recent samples

use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// A window of at least one sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }
}

impl RollingWindow<Duration> {
    pub fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_sample_falls_out() {
        let mut window = RollingWindow::new(2);
        window.push(Duration::from_millis(10));
        window.push(Duration::from_millis(20));
        assert_eq!(window.mean(), Duration::from_millis(15));

        window.push(Duration::from_millis(40));
        assert_eq!(window.len(), 2);
        assert_eq!(window.mean(), Duration::from_millis(30));
        assert_eq!(window.max(), Duration::from_millis(40));
    }

    #[test]
    fn empty_window_reports_zero() {
        let window: RollingWindow<Duration> = RollingWindow::new(0);
        assert!(window.is_empty());
        assert_eq!(window.mean(), Duration::ZERO);
    }
}
