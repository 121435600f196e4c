//! Terra Landscape
//!
//! Bridges background terrain generation to the simulation thread:
//! - [`LandscapeGenerator`] runs tile generation as jobs and reports
//!   lifecycle events into a [`GeneratorEventQueue`]
//! - [`LandscapeEventSystem`] drains that queue once per frame and hands
//!   each event to every [`GeneratorEventHandler`] component
//! - [`WorldEntityGenerator`] is the handler that populates freshly
//!   generated regions, once per position

pub mod event;
pub mod generator;
pub mod handler;
pub mod system;
pub mod world_generator;

pub use event::{GeneratorEvent, GeneratorEventKind, GeneratorEventQueue};
pub use generator::{GeneratorError, Heightfield, LandscapeGenerator, TileCoord};
pub use handler::{
    attach_handler, EventLogger, GeneratorEventHandler, HandleGeneratorEvent,
    GENERATOR_EVENT_HANDLER,
};
pub use system::LandscapeEventSystem;
pub use world_generator::{
    spawn_world_entity_spawner, PositionKey, RegionAnchor, WorldEntityGenerator,
    REGION_ANCHOR, WORLD_ENTITY_SPAWNER,
};
