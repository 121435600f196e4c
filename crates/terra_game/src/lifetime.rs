//! Timed removal of short-lived entities

use std::any::Any;
use terra_core::ecs::{Component, EntityManager, System};

pub const TIMED_LIFETIME: &str = "timedLifetime";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedLifetime {
    remaining: f32,
}

impl TimedLifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Count down by `delta`; true once the lifetime has run out.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.remaining -= delta;
        self.remaining <= 0.0
    }
}

impl Component for TimedLifetime {
    fn capabilities(&self) -> &'static [&'static str] {
        &[TIMED_LIFETIME]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Removes every entity whose [`TimedLifetime`] ran out this frame.
#[derive(Debug, Default)]
pub struct LifetimeSystem {
    expired: u64,
}

impl LifetimeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expired(&self) -> u64 {
        self.expired
    }
}

impl System for LifetimeSystem {
    fn update(&mut self, manager: &mut EntityManager, delta: f32) {
        let mut dead = Vec::new();
        for id in manager.get_components(TIMED_LIFETIME) {
            let Some(owner) = manager.resolve(id) else {
                continue;
            };
            let expired = manager
                .component_mut::<TimedLifetime>(id)
                .is_some_and(|lifetime| lifetime.tick(delta));
            if expired {
                dead.push(owner);
            }
        }

        for owner in dead {
            if manager.remove(owner) {
                self.expired += 1;
                tracing::trace!(%owner, "lifetime expired");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_are_removed_once_time_runs_out() {
        let mut manager = EntityManager::new();
        manager.register_system("lifetime", LifetimeSystem::new()).unwrap();

        let short = manager.create(None);
        manager.attach(short, TimedLifetime::new(0.25));
        manager.add(short);
        let long = manager.create(None);
        manager.attach(long, TimedLifetime::new(1.0));
        manager.add(long);

        manager.update(0.2);
        assert!(manager.exists(short));

        manager.update(0.2);
        assert!(!manager.exists(short));
        assert!(manager.exists(long));
        assert_eq!(manager.get_components(TIMED_LIFETIME).len(), 1);
    }

    #[test]
    fn staged_entities_do_not_age() {
        let mut manager = EntityManager::new();
        manager.register_system("lifetime", LifetimeSystem::new()).unwrap();

        let staged = manager.create(None);
        let id = manager.attach(staged, TimedLifetime::new(0.1)).unwrap();
        manager.update(1.0);

        assert!(manager.exists(staged));
        assert_eq!(manager.component::<TimedLifetime>(id).map(TimedLifetime::remaining), Some(0.1));
    }
}
