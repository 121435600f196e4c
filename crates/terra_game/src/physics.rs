//! Physics seam
//!
//! The simulation never owns a physics engine. It asks a [`PhysicsWorld`]
//! for bodies and keeps whatever comes back in a [`RigidBody`] component;
//! a world is free to hand out nothing at all.

use std::any::Any;
use std::rc::Rc;
use terra_core::ecs::{Component, EntityManager, System};
use terra_core::glam::Vec3;

pub const RIGID_BODY: &str = "rigidBody";

/// Backend identity of a body, stable for the body's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Two bodies touching after a step. `normal` points from `b` towards `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
    pub point: Vec3,
    pub normal: Vec3,
}

/// One simulated body owned by the physics backend.
pub trait PhysicsBody {
    fn id(&self) -> BodyId;
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
}

pub trait PhysicsWorld {
    /// A new body at `position`, or `None` when the backend cannot
    /// provide one.
    fn create_body(&self, position: Vec3) -> Option<Box<dyn PhysicsBody>>;

    /// Advance the backend by `delta` seconds.
    fn step(&self, _delta: f32) {}

    /// Contacts found since the last call. Draining: each contact is
    /// reported once.
    fn filter_collisions(&self) -> Vec<Contact> {
        Vec::new()
    }
}

/// A world without a backend. Every spawn goes ahead without a body.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPhysics;

impl PhysicsWorld for HeadlessPhysics {
    fn create_body(&self, _position: Vec3) -> Option<Box<dyn PhysicsBody>> {
        None
    }
}

pub struct RigidBody {
    body: Box<dyn PhysicsBody>,
}

impl RigidBody {
    pub fn new(body: Box<dyn PhysicsBody>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &dyn PhysicsBody {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> &mut dyn PhysicsBody {
        self.body.as_mut()
    }
}

impl Component for RigidBody {
    fn capabilities(&self) -> &'static [&'static str] {
        &[RIGID_BODY]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Steps the physics world, then copies every body position onto its
/// owner's scene node.
pub struct SyncRigidBodySystem {
    world: Rc<dyn PhysicsWorld>,
}

impl SyncRigidBodySystem {
    pub fn new(world: Rc<dyn PhysicsWorld>) -> Self {
        Self { world }
    }
}

impl System for SyncRigidBodySystem {
    fn update(&mut self, manager: &mut EntityManager, delta: f32) {
        self.world.step(delta);

        for id in manager.get_components(RIGID_BODY) {
            let Some(owner) = manager.resolve(id) else {
                continue;
            };
            let Some(position) = manager.component::<RigidBody>(id).map(|rb| rb.body().position())
            else {
                continue;
            };
            if let Some(node) = manager.node_mut(owner) {
                node.transform.position = position;
            }
        }
    }
}
