use crate::ecs::{EntityManager, SystemRegistrationError};
use std::collections::HashMap;
use std::fmt;

/// Position of a registered system in the update order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemHandle(u32);

impl SystemHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system {}", self.0)
    }
}

/// A per-frame driver over entities and components.
///
/// Systems run once per `EntityManager::update`, in registration order,
/// before any entity's own component logic.
pub trait System {
    fn update(&mut self, manager: &mut EntityManager, delta: f32);
}

impl<F> System for F
where
    F: FnMut(&mut EntityManager, f32),
{
    fn update(&mut self, manager: &mut EntityManager, delta: f32) {
        self(manager, delta)
    }
}

/// Named systems in a fixed, deterministic order.
///
/// A system is taken out of its slot while it runs so it can borrow the
/// manager mutably. Systems registered mid-update land after the current
/// ones and first run on the next frame.
#[derive(Default)]
pub(crate) struct SystemRegistry {
    systems: Vec<RegisteredSystem>,
    name_lookup: HashMap<String, SystemHandle>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        system: Box<dyn System>,
    ) -> Result<SystemHandle, SystemRegistrationError> {
        if name.is_empty() {
            return Err(SystemRegistrationError::EmptyName);
        }
        if let Some(existing) = self.name_lookup.get(name) {
            return Err(SystemRegistrationError::DuplicateName {
                name: name.to_string(),
                existing: *existing,
            });
        }

        let handle = SystemHandle::new(self.systems.len() as u32);
        self.name_lookup.insert(name.to_string(), handle);
        self.systems.push(RegisteredSystem {
            name: name.to_string(),
            system: Some(system),
        });
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> Option<SystemHandle> {
        self.name_lookup.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn name(&self, handle: SystemHandle) -> Option<&str> {
        self.systems
            .get(handle.index() as usize)
            .map(|system| system.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|system| system.name.as_str())
    }

    /// Detach the system at `index` for the duration of its update.
    pub fn take(&mut self, index: usize) -> Option<Box<dyn System>> {
        self.systems.get_mut(index)?.system.take()
    }

    pub fn restore(&mut self, index: usize, system: Box<dyn System>) {
        if let Some(slot) = self.systems.get_mut(index) {
            slot.system = Some(system);
        }
    }
}

struct RegisteredSystem {
    name: String,
    system: Option<Box<dyn System>>,
}
