//! Entity Component System core types.
//!
//! Entities are generational handles owned by the [`EntityManager`].
//! Components are type-erased behaviour attached to one entity and
//! discovered through capability names rather than static types. The
//! manager also owns the named systems that drive each frame.

mod capability;
mod component;
mod entity;
mod manager;
mod system;
mod system_registration_error;

pub use capability::CapabilityRegistry;
pub use component::{downcast_mut, downcast_ref, Component, ComponentId};
pub use entity::Entity;
pub use manager::EntityManager;
pub use system::{System, SystemHandle};
pub use system_registration_error::SystemRegistrationError;
