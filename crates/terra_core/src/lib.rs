//! Terra Engine Core
//!
//! Contains the fundamental simulation pieces:
//! - Entity manager with capability-based component lookup
//! - Named per-frame systems
//! - Scene nodes with shared templates
//! - Cross-thread mailbox and async job queue
//! - Simulation time and deterministic math

pub mod ecs;
pub mod jobs;
pub mod mailbox;
pub mod math;
pub mod scene;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
