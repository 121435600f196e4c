//! Terra Game
//!
//! Gameplay components built on the entity manager: the player, input
//! handlers such as the box spawner, the projectiles they fire and the
//! systems that age, collide and move those projectiles. Physics is reached only
//! through the [`PhysicsWorld`] seam.

pub mod collision;
pub mod input;
pub mod lifetime;
pub mod physics;
pub mod player;
pub mod spawner;
pub mod templates;

pub use collision::{
    attach_collision_handler, CollisionEvent, CollisionHandler, CollisionSystem, ContactLogger,
    HandleCollision, COLLISION_HANDLER,
};
pub use input::{
    attach_input_handler, HandleInput, InputHandler, InputHandlerSystem, INPUT_HANDLER,
};
pub use lifetime::{LifetimeSystem, TimedLifetime, TIMED_LIFETIME};
pub use physics::{
    BodyId, Contact, HeadlessPhysics, PhysicsBody, PhysicsWorld, RigidBody, SyncRigidBodySystem,
    RIGID_BODY,
};
pub use player::{spawn_player, Player, PLAYER};
pub use spawner::{BoxBullet, BoxSpawner, BOX_BULLET};
pub use templates::BulletTemplate;
