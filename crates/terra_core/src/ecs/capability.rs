//! Capability registry
//!
//! Maps a capability name to the components currently offering it, in
//! registration order, plus the reverse map from component to owner.
//! Only the simulation thread touches it, so there is no locking here.

use crate::ecs::{ComponentId, Entity};
use indexmap::IndexSet;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    providers: HashMap<String, IndexSet<ComponentId>>,
    owners: HashMap<ComponentId, Entity>,
    names: HashMap<ComponentId, Vec<String>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the owner of a component. Must precede `register`.
    pub fn bind_owner(&mut self, component: ComponentId, owner: Entity) {
        self.owners.insert(component, owner);
    }

    /// Offer `name` through `component`.
    ///
    /// Registering the same pair twice keeps the original position.
    /// Returns false if the component has no bound owner.
    pub fn register(&mut self, component: ComponentId, name: &str) -> bool {
        if !self.owners.contains_key(&component) {
            return false;
        }

        let inserted = self
            .providers
            .entry(name.to_string())
            .or_default()
            .insert(component);
        if inserted {
            self.names.entry(component).or_default().push(name.to_string());
        }
        true
    }

    /// All components offering `name`, in registration order.
    pub fn lookup<'a>(&'a self, name: &str) -> impl Iterator<Item = ComponentId> + 'a {
        self.providers
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Owning entity of a registered component.
    pub fn resolve(&self, component: ComponentId) -> Option<Entity> {
        self.owners.get(&component).copied()
    }

    pub fn offers(&self, component: ComponentId, name: &str) -> bool {
        self.providers
            .get(name)
            .is_some_and(|set| set.contains(&component))
    }

    /// Names registered for a component, in registration order.
    pub fn capabilities_of(&self, component: ComponentId) -> &[String] {
        self.names.get(&component).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop a component from every capability set and forget its owner.
    pub fn unregister(&mut self, component: ComponentId) {
        if let Some(names) = self.names.remove(&component) {
            for name in names {
                if let Some(set) = self.providers.get_mut(&name) {
                    set.shift_remove(&component);
                    if set.is_empty() {
                        self.providers.remove(&name);
                    }
                }
            }
        }
        self.owners.remove(&component);
    }

    /// Number of components with a bound owner.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
