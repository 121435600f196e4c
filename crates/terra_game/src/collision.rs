//! Collision dispatch
//!
//! After the physics world steps, [`CollisionSystem`] drains its contacts
//! and hands each one to the `"collisionHandler"` components of both
//! touching entities. Each side sees the normal pointing towards itself.

use crate::physics::{BodyId, PhysicsWorld, RigidBody, RIGID_BODY};
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use terra_core::ecs::{Component, ComponentId, Entity, EntityManager, System};
use terra_core::glam::Vec3;

pub const COLLISION_HANDLER: &str = "collisionHandler";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The entity on the other side, if its body belongs to one.
    pub other: Option<Entity>,
    pub point: Vec3,
    pub normal: Vec3,
}

pub trait HandleCollision: Any {
    fn on_collision(&mut self, manager: &mut EntityManager, owner: Entity, event: &CollisionEvent);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub struct CollisionHandler {
    handler: Box<dyn HandleCollision>,
}

impl CollisionHandler {
    pub fn new<H: HandleCollision>(handler: H) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    pub fn handler<H: HandleCollision>(&self) -> Option<&H> {
        self.handler.as_any().downcast_ref::<H>()
    }
}

impl Component for CollisionHandler {
    fn capabilities(&self) -> &'static [&'static str] {
        &[COLLISION_HANDLER]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn attach_collision_handler<H: HandleCollision>(
    manager: &mut EntityManager,
    entity: Entity,
    handler: H,
) -> Option<ComponentId> {
    manager.attach(entity, CollisionHandler::new(handler))
}

/// Counts contacts and logs them at debug.
#[derive(Debug, Default)]
pub struct ContactLogger {
    contacts: usize,
}

impl ContactLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> usize {
        self.contacts
    }
}

impl HandleCollision for ContactLogger {
    fn on_collision(&mut self, _: &mut EntityManager, owner: Entity, event: &CollisionEvent) {
        self.contacts += 1;
        tracing::debug!(%owner, other = ?event.other, point = ?event.point, "contact");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct CollisionSystem {
    world: Rc<dyn PhysicsWorld>,
}

impl CollisionSystem {
    pub fn new(world: Rc<dyn PhysicsWorld>) -> Self {
        Self { world }
    }

    fn body_owners(manager: &EntityManager) -> HashMap<BodyId, Entity> {
        manager
            .get_components(RIGID_BODY)
            .into_iter()
            .filter_map(|id| {
                let owner = manager.resolve(id)?;
                let body = manager.component::<RigidBody>(id)?.body().id();
                Some((body, owner))
            })
            .collect()
    }
}

impl System for CollisionSystem {
    fn update(&mut self, manager: &mut EntityManager, _delta: f32) {
        let contacts = self.world.filter_collisions();
        if contacts.is_empty() {
            return;
        }
        let owners = Self::body_owners(manager);
        let handlers = manager.get_components(COLLISION_HANDLER);

        for contact in contacts {
            let sides = [
                (contact.a, contact.b, contact.normal),
                (contact.b, contact.a, -contact.normal),
            ];
            for (body, other, normal) in sides {
                let Some(&owner) = owners.get(&body) else {
                    continue;
                };
                let event = CollisionEvent {
                    other: owners.get(&other).copied(),
                    point: contact.point,
                    normal,
                };
                for &id in &handlers {
                    // A handler may have removed this entity already.
                    if manager.resolve(id) != Some(owner) || !manager.is_live(owner) {
                        continue;
                    }
                    manager.with_component::<CollisionHandler, _, _>(id, |c, manager, owner| {
                        c.handler.on_collision(manager, owner, &event)
                    });
                }
            }
        }
    }
}
