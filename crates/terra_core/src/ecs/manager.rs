// manager.rs - Owns entities, components, the capability registry and systems
//
// Entities are created staged: they can receive components and be
// queried by handle, but global capability lookups and updates ignore
// them until `add` makes them live.

use crate::ecs::component::{downcast_mut, downcast_ref};
use crate::ecs::entity::EntityAllocator;
use crate::ecs::system::SystemRegistry;
use crate::ecs::{
    CapabilityRegistry, Component, ComponentId, Entity, System, SystemHandle,
    SystemRegistrationError,
};
use crate::scene::{set_node, SceneNode, Transform};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::Arc;
use terra_metrics::SystemProfiler;

struct EntityRecord {
    /// Shared with scene snapshots; mutation copies on write.
    node: Option<Arc<SceneNode>>,
    components: Vec<ComponentId>,
}

struct ComponentSlot {
    owner: Entity,
    /// `None` while the component is detached for dispatch.
    component: Option<Box<dyn Component>>,
}

pub struct EntityManager {
    allocator: EntityAllocator,
    records: HashMap<Entity, EntityRecord>,
    live: IndexSet<Entity>,
    components: HashMap<ComponentId, ComponentSlot>,
    registry: CapabilityRegistry,
    systems: SystemRegistry,
    profiler: SystemProfiler,
    next_component: u64,
    frame: u64,
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            records: HashMap::new(),
            live: IndexSet::new(),
            components: HashMap::new(),
            registry: CapabilityRegistry::new(),
            systems: SystemRegistry::new(),
            profiler: SystemProfiler::new(),
            next_component: 1,
            frame: 0,
        }
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    /// Construct a staged entity, optionally owning a scene node.
    pub fn create(&mut self, node: Option<SceneNode>) -> Entity {
        let entity = self.allocator.allocate();
        self.records.insert(
            entity,
            EntityRecord {
                node: node.map(Arc::new),
                components: Vec::new(),
            },
        );
        tracing::trace!(%entity, "entity created");
        entity
    }

    /// Make a staged entity live. Adding twice, or adding a removed
    /// entity, is a no-op that returns false.
    pub fn add(&mut self, entity: Entity) -> bool {
        if !self.records.contains_key(&entity) {
            tracing::debug!(%entity, "add ignored for unknown entity");
            return false;
        }
        let added = self.live.insert(entity);
        if added {
            tracing::trace!(%entity, "entity added");
        }
        added
    }

    /// Unregister every component of `entity`, then destroy it.
    ///
    /// Safe to call from inside a dispatch: a detached component of the
    /// removed entity is dropped instead of re-attached.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(record) = self.records.remove(&entity) else {
            return false;
        };

        for id in &record.components {
            self.registry.unregister(*id);
            self.components.remove(id);
        }
        self.live.shift_remove(&entity);
        self.allocator.free(entity);

        tracing::debug!(%entity, components = record.components.len(), "entity removed");
        true
    }

    /// Whether the handle refers to an entity that has not been removed.
    pub fn exists(&self, entity: Entity) -> bool {
        self.records.contains_key(&entity)
    }

    pub fn is_live(&self, entity: Entity) -> bool {
        self.live.contains(&entity)
    }

    /// Live entities in the order they were added.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter().copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn node(&self, entity: Entity) -> Option<&SceneNode> {
        self.records.get(&entity)?.node.as_deref()
    }

    /// Mutable access to an entity's node. A node still held by a scene
    /// snapshot is copied first, so the snapshot keeps what it saw.
    pub fn node_mut(&mut self, entity: Entity) -> Option<&mut SceneNode> {
        self.records
            .get_mut(&entity)?
            .node
            .as_mut()
            .map(Arc::make_mut)
    }

    /// Snapshot of the world as one scene graph: a group holding every
    /// live entity's node, named by entity, in add order. Staged entities
    /// and entities without a node are left out.
    pub fn scene_root(&self) -> SceneNode {
        let mut root = SceneNode::group(Transform::IDENTITY);
        for entity in &self.live {
            let Some(node) = self.records.get(entity).and_then(|r| r.node.as_ref()) else {
                continue;
            };
            set_node(entity.to_string(), &mut root, Arc::clone(node));
        }
        root
    }

    // ------------------------------------------------------------------
    // Components and capabilities
    // ------------------------------------------------------------------

    /// Attach a component to `entity` and register the capabilities it
    /// advertises. Returns `None` if the entity does not exist.
    pub fn attach<C: Component>(&mut self, entity: Entity, component: C) -> Option<ComponentId> {
        let record = self.records.get_mut(&entity)?;

        let id = ComponentId::new(self.next_component);
        self.next_component += 1;
        record.components.push(id);

        let capabilities = component.capabilities();
        self.components.insert(
            id,
            ComponentSlot {
                owner: entity,
                component: Some(Box::new(component)),
            },
        );
        self.registry.bind_owner(id, entity);
        for name in capabilities {
            self.registry.register(id, name);
        }

        tracing::trace!(%entity, component = %id, ?capabilities, "component attached");
        Some(id)
    }

    /// Offer an additional capability name through `component`.
    pub fn register(&mut self, component: ComponentId, name: &str) -> bool {
        self.registry.register(component, name)
    }

    /// Components of live entities offering `name`, in registration order.
    pub fn get_components(&self, name: &str) -> Vec<ComponentId> {
        self.registry
            .lookup(name)
            .filter(|id| {
                self.registry
                    .resolve(*id)
                    .is_some_and(|owner| self.live.contains(&owner))
            })
            .collect()
    }

    /// Owning entity of a component, or `None` once the owner is gone.
    pub fn resolve(&self, component: ComponentId) -> Option<Entity> {
        self.registry
            .resolve(component)
            .filter(|owner| self.records.contains_key(owner))
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Components attached to `entity`, in attach order.
    pub fn components_of(&self, entity: Entity) -> &[ComponentId] {
        self.records
            .get(&entity)
            .map(|record| record.components.as_slice())
            .unwrap_or(&[])
    }

    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        let component = self.components.get(&id)?.component.as_deref()?;
        downcast_ref::<T>(component)
    }

    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        let component = self.components.get_mut(&id)?.component.as_deref_mut()?;
        downcast_mut::<T>(component)
    }

    /// The component `entity` offers under `name`, downcast to `T`.
    ///
    /// `None` when the entity lacks the capability or the component is a
    /// different type. Works on staged entities too.
    pub fn cast_to<T: Component>(&mut self, entity: Entity, name: &str) -> Option<&mut T> {
        let id = self
            .components_of(entity)
            .iter()
            .copied()
            .find(|id| self.registry.offers(*id, name))?;
        self.component_mut::<T>(id)
    }

    /// First live entity offering every name in `names`.
    pub fn find_first(&self, names: &[&str]) -> Option<Entity> {
        self.search_entities(names).into_iter().next()
    }

    /// Live entities offering every name in `names`, ordered by the
    /// registration order of the first name.
    pub fn search_entities(&self, names: &[&str]) -> IndexSet<Entity> {
        let Some((first, rest)) = names.split_first() else {
            return IndexSet::new();
        };

        self.get_components(first)
            .into_iter()
            .filter_map(|id| self.registry.resolve(id))
            .filter(|entity| {
                rest.iter().all(|name| {
                    self.components_of(*entity)
                        .iter()
                        .any(|id| self.registry.offers(*id, name))
                })
            })
            .collect()
    }

    /// Detach component `id`, run `f` with it and the manager, then put it
    /// back unless its owner was removed in the meantime.
    ///
    /// Returns `None` if the component is missing, already detached, or
    /// not a `T`. While detached, the component is invisible to
    /// `component`/`cast_to`.
    pub fn with_component<T, R, F>(&mut self, id: ComponentId, f: F) -> Option<R>
    where
        T: Component,
        F: FnOnce(&mut T, &mut EntityManager, Entity) -> R,
    {
        self.with_detached(id, |component, manager, owner| {
            downcast_mut::<T>(component).map(|typed| f(typed, manager, owner))
        })
        .flatten()
    }

    fn with_detached<R, F>(&mut self, id: ComponentId, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn Component, &mut EntityManager, Entity) -> R,
    {
        let slot = self.components.get_mut(&id)?;
        let owner = slot.owner;
        let mut component = slot.component.take()?;

        let result = f(&mut *component, self, owner);

        match self.components.get_mut(&id) {
            Some(slot) => slot.component = Some(component),
            None => tracing::trace!(component = %id, "owner removed during dispatch"),
        }
        Some(result)
    }

    // ------------------------------------------------------------------
    // Systems and the frame loop
    // ------------------------------------------------------------------

    pub fn register_system<S>(
        &mut self,
        name: &str,
        system: S,
    ) -> Result<SystemHandle, SystemRegistrationError>
    where
        S: System + 'static,
    {
        let handle = self.systems.register(name, Box::new(system))?;
        tracing::debug!(system = name, %handle, "system registered");
        Ok(handle)
    }

    pub fn system_handle(&self, name: &str) -> Option<SystemHandle> {
        self.systems.handle(name)
    }

    /// System names in update order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.names()
    }

    /// Advance one frame: every system in registration order, then every
    /// live entity's components in add/attach order.
    pub fn update(&mut self, delta: f32) {
        self.frame += 1;

        let mut profiler = std::mem::take(&mut self.profiler);
        let count = self.systems.len();
        for index in 0..count {
            let Some(mut system) = self.systems.take(index) else {
                continue;
            };
            let name = self
                .systems
                .name(SystemHandle::new(index as u32))
                .unwrap_or("<unnamed>")
                .to_string();
            profiler.time_system(&name, || system.update(self, delta));
            self.systems.restore(index, system);
        }
        self.profiler = profiler;

        let entities: Vec<Entity> = self.live.iter().copied().collect();
        for entity in entities {
            let components = self.components_of(entity).to_vec();
            for id in components {
                if !self.live.contains(&entity) {
                    break;
                }
                self.with_detached(id, |component, manager, owner| {
                    component.update(manager, owner, delta)
                });
            }
        }
    }

    /// Number of completed `update` calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tag(&'static [&'static str]);

    impl Component for Tag {
        fn capabilities(&self) -> &'static [&'static str] {
            self.0
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Counter {
        ticks: u32,
    }

    impl Component for Counter {
        fn capabilities(&self) -> &'static [&'static str] {
            &["counter"]
        }
        fn update(&mut self, _manager: &mut EntityManager, _owner: Entity, _delta: f32) {
            self.ticks += 1;
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn staged_entities_are_invisible_until_added() {
        let mut manager = EntityManager::new();
        let entity = manager.create(None);
        let id = manager.attach(entity, Tag(&["player"])).unwrap();

        assert!(manager.get_components("player").is_empty());
        assert_eq!(manager.resolve(id), Some(entity));
        assert!(manager.cast_to::<Tag>(entity, "player").is_some());

        assert!(manager.add(entity));
        assert!(!manager.add(entity));
        assert_eq!(manager.get_components("player"), vec![id]);
        assert_eq!(manager.live_count(), 1);
    }

    #[test]
    fn removal_drops_every_capability() {
        let mut manager = EntityManager::new();
        let entity = manager.create(None);
        let a = manager.attach(entity, Tag(&["health", "player"])).unwrap();
        let b = manager.attach(entity, Tag(&["healthbar"])).unwrap();
        manager.add(entity);

        assert!(manager.remove(entity));
        assert!(!manager.remove(entity));

        for name in ["health", "player", "healthbar"] {
            assert!(manager.get_components(name).is_empty());
        }
        assert_eq!(manager.resolve(a), None);
        assert_eq!(manager.resolve(b), None);
        assert!(!manager.exists(entity));
        assert!(!manager.add(entity));
    }

    #[test]
    fn cast_to_checks_capability_and_type() {
        let mut manager = EntityManager::new();
        let entity = manager.create(None);
        manager.attach(entity, Counter { ticks: 0 });
        manager.add(entity);

        assert!(manager.cast_to::<Counter>(entity, "counter").is_some());
        assert!(manager.cast_to::<Tag>(entity, "counter").is_none());
        assert!(manager.cast_to::<Counter>(entity, "rigidBody").is_none());
    }

    #[test]
    fn registering_extra_names_is_idempotent() {
        let mut manager = EntityManager::new();
        let entity = manager.create(None);
        let id = manager.attach(entity, Tag(&["generatorEventHandler"])).unwrap();
        manager.add(entity);

        assert!(manager.register(id, "worldEntitySpawner"));
        assert!(manager.register(id, "generatorEventHandler"));
        assert_eq!(manager.get_components("generatorEventHandler"), vec![id]);
        assert_eq!(manager.get_components("worldEntitySpawner"), vec![id]);
    }

    #[test]
    fn search_requires_every_capability() {
        let mut manager = EntityManager::new();
        let both = manager.create(None);
        manager.attach(both, Tag(&["player"]));
        manager.attach(both, Tag(&["health"]));
        manager.add(both);

        let only_health = manager.create(None);
        manager.attach(only_health, Tag(&["health"]));
        manager.add(only_health);

        let found = manager.search_entities(&["health", "player"]);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![both]);
        assert_eq!(manager.find_first(&["health"]), Some(both));
        assert_eq!(manager.find_first(&[]), None);
    }

    #[test]
    fn systems_run_in_registration_order_before_entities() {
        let mut manager = EntityManager::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let entity = manager.create(None);
        let counter = manager.attach(entity, Counter { ticks: 0 }).unwrap();
        manager.add(entity);

        for name in ["lifetime", "syncPhysics", "input"] {
            let log = Rc::clone(&log);
            let observed = counter;
            manager
                .register_system(name, move |manager: &mut EntityManager, _delta: f32| {
                    let ticks = manager.component::<Counter>(observed).map(|c| c.ticks);
                    log.borrow_mut().push((name, ticks));
                })
                .unwrap();
        }

        manager.update(0.016);
        manager.update(0.016);

        assert_eq!(
            *log.borrow(),
            vec![
                ("lifetime", Some(0)),
                ("syncPhysics", Some(0)),
                ("input", Some(0)),
                ("lifetime", Some(1)),
                ("syncPhysics", Some(1)),
                ("input", Some(1)),
            ]
        );
        assert_eq!(manager.frame(), 2);
    }

    #[test]
    fn duplicate_system_names_are_rejected() {
        let mut manager = EntityManager::new();
        manager
            .register_system("input", |_: &mut EntityManager, _: f32| {})
            .unwrap();
        let err = manager
            .register_system("input", |_: &mut EntityManager, _: f32| {})
            .unwrap_err();
        assert!(matches!(err, SystemRegistrationError::DuplicateName { .. }));
        assert!(matches!(
            manager.register_system("", |_: &mut EntityManager, _: f32| {}),
            Err(SystemRegistrationError::EmptyName)
        ));
    }

    #[test]
    fn with_component_survives_owner_removal() {
        let mut manager = EntityManager::new();
        let entity = manager.create(None);
        let id = manager.attach(entity, Counter { ticks: 0 }).unwrap();
        manager.add(entity);

        let ran = manager.with_component::<Counter, _, _>(id, |counter, manager, owner| {
            counter.ticks += 1;
            assert!(manager.component::<Counter>(id).is_none());
            manager.remove(owner)
        });

        assert_eq!(ran, Some(true));
        assert!(manager.component::<Counter>(id).is_none());
        assert!(manager.with_component::<Counter, _, _>(id, |_, _, _| ()).is_none());
    }

    #[test]
    fn with_component_rejects_wrong_type_without_losing_it() {
        let mut manager = EntityManager::new();
        let entity = manager.create(None);
        let id = manager.attach(entity, Counter { ticks: 3 }).unwrap();

        assert!(manager.with_component::<Tag, _, _>(id, |_, _, _| ()).is_none());
        assert_eq!(manager.component::<Counter>(id).map(|c| c.ticks), Some(3));
    }

    #[test]
    fn nodes_belong_to_their_entity() {
        use glam::Vec3;

        let mut manager = EntityManager::new();
        let entity = manager.create(Some(SceneNode::group(Transform::IDENTITY)));
        if let Some(node) = manager.node_mut(entity) {
            node.transform.position = Vec3::new(1.0, 2.0, 3.0);
        }
        assert_eq!(
            manager.node(entity).map(|n| n.transform.position),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );

        let bare = manager.create(None);
        assert!(manager.node(bare).is_none());
    }

    #[test]
    fn scene_root_shares_live_nodes() {
        use glam::Vec3;

        let mut manager = EntityManager::new();
        let a = manager.create(Some(SceneNode::group(Transform::from_position(Vec3::X))));
        manager.add(a);
        let bare = manager.create(None);
        manager.add(bare);
        let staged = manager.create(Some(SceneNode::default()));
        let b = manager.create(Some(SceneNode::group(Transform::from_position(Vec3::Z))));
        manager.add(b);

        let root = manager.scene_root();
        let names: Vec<&str> = root.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec![a.to_string().as_str(), b.to_string().as_str()]);
        assert!(root.child(&staged.to_string()).is_none());
        let shared = root.child(&a.to_string()).unwrap();
        assert!(std::ptr::eq(Arc::as_ptr(shared), manager.node(a).unwrap()));
    }

    #[test]
    fn moving_a_node_leaves_earlier_snapshots_alone() {
        use glam::Vec3;

        let mut manager = EntityManager::new();
        let entity = manager.create(Some(SceneNode::group(Transform::IDENTITY)));
        manager.add(entity);

        let before = manager.scene_root();
        manager.node_mut(entity).unwrap().transform.position = Vec3::Y;
        let after = manager.scene_root();

        let position = |root: &SceneNode| {
            root.child(&entity.to_string())
                .map(|node| node.transform.position)
        };
        assert_eq!(position(&before), Some(Vec3::ZERO));
        assert_eq!(position(&after), Some(Vec3::Y));

        manager.remove(entity);
        assert_eq!(manager.scene_root().children().count(), 0);
        assert_eq!(position(&before), Some(Vec3::ZERO));
    }
}
