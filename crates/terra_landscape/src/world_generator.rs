//! Populates generated regions, once per region position

use crate::event::{GeneratorEvent, GeneratorEventKind};
use crate::handler::{attach_handler, HandleGeneratorEvent};
use std::any::Any;
use std::collections::HashSet;
use terra_core::ecs::{Component, ComponentId, Entity, EntityManager};
use terra_core::glam::Vec3;
use terra_core::scene::{SceneNode, Transform};

/// Capability of the entity hosting a [`WorldEntityGenerator`].
pub const WORLD_ENTITY_SPAWNER: &str = "worldEntitySpawner";

/// Capability of the entities the default populator spawns.
pub const REGION_ANCHOR: &str = "regionAnchor";

/// Exact bit pattern of a position. Two events share a key only if their
/// coordinates compare equal as floats; `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey([u32; 3]);

impl From<Vec3> for PositionKey {
    fn from(position: Vec3) -> Self {
        let bits = |v: f32| (v + 0.0).to_bits();
        Self([bits(position.x), bits(position.y), bits(position.z)])
    }
}

/// Marks a populated region; spawned once per generated position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionAnchor {
    pub position: Vec3,
    pub extent: Vec3,
}

impl Component for RegionAnchor {
    fn capabilities(&self) -> &'static [&'static str] {
        &[REGION_ANCHOR]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

type Populator = Box<dyn FnMut(&mut EntityManager, &GeneratorEvent)>;

/// Deduplicating handler.
///
/// The first `Generated` event for a position runs the populator exactly
/// once; repeats are ignored. Positions are kept for the life of the
/// handler and never evicted, so memory grows with the explored area.
pub struct WorldEntityGenerator {
    positions: HashSet<PositionKey>,
    populate: Populator,
    spawns: usize,
}

impl WorldEntityGenerator {
    /// Generator whose populator spawns one [`RegionAnchor`] per region.
    pub fn new() -> Self {
        Self::with_populator(spawn_region_anchor)
    }

    pub fn with_populator<F>(populate: F) -> Self
    where
        F: FnMut(&mut EntityManager, &GeneratorEvent) + 'static,
    {
        Self {
            positions: HashSet::new(),
            populate: Box::new(populate),
            spawns: 0,
        }
    }

    /// Populator runs so far.
    pub fn spawn_count(&self) -> usize {
        self.spawns
    }

    pub fn tracked_positions(&self) -> usize {
        self.positions.len()
    }

    pub fn has_seen(&self, position: Vec3) -> bool {
        self.positions.contains(&PositionKey::from(position))
    }
}

impl Default for WorldEntityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleGeneratorEvent for WorldEntityGenerator {
    fn handle_event(&mut self, manager: &mut EntityManager, owner: Entity, event: &GeneratorEvent) {
        match event.kind {
            GeneratorEventKind::Generated => {
                if !self.positions.insert(PositionKey::from(event.position)) {
                    tracing::trace!(%owner, position = ?event.position, "region already populated");
                    return;
                }
                self.spawns += 1;
                tracing::debug!(%owner, position = ?event.position, "populating region");
                (self.populate)(manager, event);
            }
            // Regions are not depopulated.
            GeneratorEventKind::Deleted => {
                tracing::trace!(%owner, position = ?event.position, "region deleted, ignored");
            }
            GeneratorEventKind::Started => {}
        }
    }

    fn extra_capabilities(&self) -> &'static [&'static str] {
        &["worldEntityGenerator"]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn spawn_region_anchor(manager: &mut EntityManager, event: &GeneratorEvent) {
    let node = SceneNode::group(Transform::from_position(event.position));
    let anchor = manager.create(Some(node));
    manager.attach(
        anchor,
        RegionAnchor {
            position: event.position,
            extent: event.extent,
        },
    );
    manager.add(anchor);
}

/// Create and add an entity hosting `generator`, tagged as the world
/// entity spawner. Returns the entity and the handler component.
pub fn spawn_world_entity_spawner(
    manager: &mut EntityManager,
    generator: WorldEntityGenerator,
) -> Option<(Entity, ComponentId)> {
    let entity = manager.create(None);
    let id = attach_handler(manager, entity, generator)?;
    manager.register(id, WORLD_ENTITY_SPAWNER);
    manager.add(entity);
    Some((entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::GeneratorEventHandler;

    fn generator_of(manager: &EntityManager, id: ComponentId) -> &WorldEntityGenerator {
        manager
            .component::<GeneratorEventHandler>(id)
            .and_then(|h| h.handler::<WorldEntityGenerator>())
            .unwrap()
    }

    fn deliver(manager: &mut EntityManager, id: ComponentId, event: GeneratorEvent) {
        manager.with_component::<GeneratorEventHandler, _, _>(id, |handler, manager, owner| {
            handler.handle_event(manager, owner, &event)
        });
    }

    #[test]
    fn keys_use_exact_float_equality() {
        assert_eq!(
            PositionKey::from(Vec3::new(0.0, 1.0, 2.0)),
            PositionKey::from(Vec3::new(-0.0, 1.0, 2.0))
        );
        assert_ne!(
            PositionKey::from(Vec3::new(10.0, 0.0, 10.0)),
            PositionKey::from(Vec3::new(10.000001, 0.0, 10.0))
        );
    }

    #[test]
    fn repeated_positions_populate_once() {
        let mut manager = EntityManager::new();
        let (_, id) = spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();

        let here = GeneratorEvent::generated(Vec3::new(10.0, 0.0, 10.0), Vec3::splat(5.0));
        let there = GeneratorEvent::generated(Vec3::new(42.0, 0.0, 10.0), Vec3::splat(5.0));
        deliver(&mut manager, id, here);
        deliver(&mut manager, id, here);
        deliver(&mut manager, id, there);

        assert_eq!(generator_of(&manager, id).spawn_count(), 2);
        assert_eq!(manager.get_components(REGION_ANCHOR).len(), 2);
        assert!(generator_of(&manager, id).has_seen(Vec3::new(10.0, 0.0, 10.0)));
    }

    #[test]
    fn started_and_deleted_spawn_nothing() {
        let mut manager = EntityManager::new();
        let (_, id) = spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();

        let position = Vec3::new(10.0, 0.0, 10.0);
        deliver(&mut manager, id, GeneratorEvent::started(position, Vec3::splat(5.0)));
        deliver(&mut manager, id, GeneratorEvent::deleted(position, Vec3::splat(5.0)));

        assert_eq!(generator_of(&manager, id).spawn_count(), 0);
        assert_eq!(generator_of(&manager, id).tracked_positions(), 0);
        assert!(manager.get_components(REGION_ANCHOR).is_empty());
    }

    #[test]
    fn deletion_does_not_forget_a_position() {
        let mut manager = EntityManager::new();
        let (_, id) = spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();

        let position = Vec3::new(-16.0, 0.0, 48.0);
        deliver(&mut manager, id, GeneratorEvent::generated(position, Vec3::ONE));
        deliver(&mut manager, id, GeneratorEvent::deleted(position, Vec3::ONE));
        deliver(&mut manager, id, GeneratorEvent::generated(position, Vec3::ONE));

        assert_eq!(generator_of(&manager, id).spawn_count(), 1);
    }

    #[test]
    fn spawner_entity_is_tagged() {
        let mut manager = EntityManager::new();
        let (entity, id) =
            spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();

        assert_eq!(manager.find_first(&[WORLD_ENTITY_SPAWNER]), Some(entity));
        assert_eq!(manager.get_components("worldEntityGenerator"), vec![id]);
    }

    #[test]
    fn anchors_sit_at_the_region_position() {
        let mut manager = EntityManager::new();
        let (_, id) = spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();
        let position = Vec3::new(16.0, 0.0, 16.0);
        deliver(&mut manager, id, GeneratorEvent::generated(position, Vec3::new(16.0, 4.0, 16.0)));

        let anchor = manager.find_first(&[REGION_ANCHOR]).unwrap();
        assert_eq!(manager.node(anchor).map(|n| n.transform.position), Some(position));
    }
}
