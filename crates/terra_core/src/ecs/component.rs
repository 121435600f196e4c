// component.rs - Behaviour attached to exactly one entity
//
// Components are stored type-erased inside the entity manager and found
// again through capability names, never through their Rust type alone.
// Callers recover the concrete type with a checked downcast.

use crate::ecs::{Entity, EntityManager};
use std::any::Any;
use std::fmt;

/// Identity of an attached component. Never reused within a manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour or state owned by one entity.
///
/// Implementors advertise the capability names they offer; the manager
/// registers them when the component is attached.
pub trait Component: Any {
    /// Capability names registered for this component on attach.
    fn capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    /// Per-frame logic, run after all systems for live owners only.
    fn update(&mut self, _manager: &mut EntityManager, _owner: Entity, _delta: f32) {}

    /// Support downcasting to the concrete component type.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to the concrete component type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Checked downcast from a type-erased component.
pub fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

/// Checked downcast from a type-erased component.
pub fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(u8);

    impl Component for Marker {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Other;

    impl Component for Other {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn downcast_checks_the_concrete_type() {
        let mut boxed: Box<dyn Component> = Box::new(Marker(4));
        assert_eq!(downcast_ref::<Marker>(boxed.as_ref()).map(|m| m.0), Some(4));
        assert!(downcast_ref::<Other>(boxed.as_ref()).is_none());

        if let Some(marker) = downcast_mut::<Marker>(boxed.as_mut()) {
            marker.0 = 9;
        }
        assert_eq!(downcast_ref::<Marker>(boxed.as_ref()).map(|m| m.0), Some(9));
    }
}
