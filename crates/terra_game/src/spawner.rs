//! Box spawner: fires a box projectile on every primary-action press

use crate::collision::{attach_collision_handler, ContactLogger};
use crate::input::HandleInput;
use crate::lifetime::TimedLifetime;
use crate::physics::{PhysicsWorld, RigidBody};
use crate::templates::BulletTemplate;
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;
use terra_core::ecs::{Component, Entity, EntityManager};
use terra_core::scene::{set_node, SceneNode, Transform};
use terra_services::{InputEvent, InputKind, SpawnerSettings};

pub const BOX_BULLET: &str = "boxBullet";

/// Marks a projectile fired by a [`BoxSpawner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBullet {
    pub fired_by: Entity,
}

impl Component for BoxBullet {
    fn capabilities(&self) -> &'static [&'static str] {
        &[BOX_BULLET]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct BoxSpawner {
    settings: SpawnerSettings,
    physics: Rc<dyn PhysicsWorld>,
    fired: usize,
}

impl BoxSpawner {
    pub fn new(settings: SpawnerSettings, physics: Rc<dyn PhysicsWorld>) -> Self {
        Self {
            settings,
            physics,
            fired: 0,
        }
    }

    pub fn fired(&self) -> usize {
        self.fired
    }

    /// Spawn one projectile in front of `owner`, facing where it faces.
    ///
    /// The projectile is added to the manager whether or not the physics
    /// world produced a body; without one it just never moves.
    pub fn fire(&mut self, manager: &mut EntityManager, owner: Entity) -> Option<Entity> {
        let Some(origin) = manager.node(owner).map(|node| node.transform) else {
            tracing::warn!(%owner, "spawner owner has no scene node");
            return None;
        };
        let forward = origin.forward();
        let position = origin.position + self.settings.muzzle_distance * forward;

        let template = BulletTemplate::shared(&self.settings);
        let mut node = SceneNode::group(Transform {
            position,
            rotation: origin.rotation,
            ..Transform::IDENTITY
        });
        set_node("model", &mut node, Arc::clone(&template.model));
        set_node("light", &mut node, Arc::clone(&template.light));

        let bullet = manager.create(Some(node));
        manager.attach(bullet, BoxBullet { fired_by: owner });
        manager.attach(bullet, TimedLifetime::new(self.settings.projectile_lifetime));

        match self.physics.create_body(position) {
            Some(mut body) => {
                body.set_velocity(self.settings.launch_speed * forward);
                manager.attach(bullet, RigidBody::new(body));
                attach_collision_handler(manager, bullet, ContactLogger::new());
            }
            None => tracing::trace!(%bullet, "no physics body, projectile stays put"),
        }

        manager.add(bullet);
        self.fired += 1;
        tracing::debug!(%owner, %bullet, ?position, "box fired");
        Some(bullet)
    }
}

impl HandleInput for BoxSpawner {
    fn handle_input(&mut self, manager: &mut EntityManager, owner: Entity, event: &InputEvent) {
        if event.is_activation(InputKind::PrimaryAction) {
            self.fire(manager, owner);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
