//! The player entity

use crate::input::attach_input_handler;
use crate::physics::PhysicsWorld;
use crate::spawner::BoxSpawner;
use std::any::Any;
use std::rc::Rc;
use terra_core::ecs::{Component, Entity, EntityManager};
use terra_core::glam::Vec3;
use terra_core::scene::{SceneNode, Transform};
use terra_landscape::{attach_handler, EventLogger};
use terra_services::SpawnerSettings;

pub const PLAYER: &str = "player";

/// Tags the entity the landscape follows. Walks its node along `walk`
/// every frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Player {
    pub walk: Vec3,
}

impl Component for Player {
    fn capabilities(&self) -> &'static [&'static str] {
        &[PLAYER]
    }

    fn update(&mut self, manager: &mut EntityManager, owner: Entity, delta: f32) {
        if self.walk == Vec3::ZERO {
            return;
        }
        if let Some(node) = manager.node_mut(owner) {
            node.transform.position += self.walk * delta;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Spawn the player at `position`: tagged, logging generator events and
/// firing boxes on primary action.
pub fn spawn_player(
    manager: &mut EntityManager,
    position: Vec3,
    spawner: SpawnerSettings,
    physics: Rc<dyn PhysicsWorld>,
) -> Entity {
    let player = manager.create(Some(SceneNode::group(Transform::from_position(position))));
    manager.attach(player, Player::default());
    attach_handler(manager, player, EventLogger::new());
    attach_input_handler(manager, player, BoxSpawner::new(spawner, physics));
    manager.add(player);
    tracing::info!(%player, ?position, "player spawned");
    player
}
