//! Landscape event system
//!
//! Once per frame: drain the generator queue, then hand each event, in
//! queue order, to every live generation handler in registration order.
//! Nothing drained is kept past the frame.

use crate::event::GeneratorEventQueue;
use crate::handler::{GeneratorEventHandler, GENERATOR_EVENT_HANDLER};
use std::sync::Arc;
use terra_core::ecs::{EntityManager, System};

pub struct LandscapeEventSystem {
    queue: Arc<GeneratorEventQueue>,
    dispatched: u64,
}

impl LandscapeEventSystem {
    pub fn new() -> Self {
        Self::with_queue(Arc::new(GeneratorEventQueue::new()))
    }

    pub fn with_queue(queue: Arc<GeneratorEventQueue>) -> Self {
        Self {
            queue,
            dispatched: 0,
        }
    }

    /// Producer side of the queue, for the generator.
    pub fn queue(&self) -> Arc<GeneratorEventQueue> {
        Arc::clone(&self.queue)
    }

    /// Handler invocations so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl Default for LandscapeEventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LandscapeEventSystem {
    fn update(&mut self, manager: &mut EntityManager, _delta: f32) {
        let events = self.queue.drain();
        if events.is_empty() {
            return;
        }
        tracing::trace!(events = events.len(), "dispatching generator events");

        for event in &events {
            for id in manager.get_components(GENERATOR_EVENT_HANDLER) {
                // An earlier handler may have removed this one's owner.
                if manager.resolve(id).is_none() {
                    tracing::trace!(handler = %id, "skipping stale handler");
                    continue;
                }

                let handled = manager.with_component::<GeneratorEventHandler, _, _>(
                    id,
                    |handler, manager, owner| handler.handle_event(manager, owner, event),
                );
                match handled {
                    Some(()) => self.dispatched += 1,
                    None => tracing::warn!(
                        handler = %id,
                        "component offers {GENERATOR_EVENT_HANDLER} but is not a handler"
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GeneratorEvent;
    use crate::handler::{attach_handler, HandleGeneratorEvent};
    use crate::world_generator::{spawn_world_entity_spawner, WorldEntityGenerator, REGION_ANCHOR};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;
    use terra_core::ecs::{Component, ComponentId, Entity};
    use terra_core::glam::Vec3;

    type Log = Rc<RefCell<Vec<(&'static str, GeneratorEvent)>>>;

    /// Records every event it receives; optionally removes an entity or
    /// pushes a follow-up event when it does.
    struct Recorder {
        name: &'static str,
        log: Log,
        remove_on_event: Option<Entity>,
        push_on_event: Option<Arc<GeneratorEventQueue>>,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                remove_on_event: None,
                push_on_event: None,
            }
        }
    }

    impl HandleGeneratorEvent for Recorder {
        fn handle_event(&mut self, manager: &mut EntityManager, _owner: Entity, event: &GeneratorEvent) {
            self.log.borrow_mut().push((self.name, *event));
            if let Some(victim) = self.remove_on_event.take() {
                manager.remove(victim);
            }
            if let Some(queue) = self.push_on_event.take() {
                queue.push(GeneratorEvent::deleted(event.position, event.extent));
            }
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Impostor;

    impl Component for Impostor {
        fn capabilities(&self) -> &'static [&'static str] {
            &[GENERATOR_EVENT_HANDLER]
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn setup() -> (EntityManager, Arc<GeneratorEventQueue>) {
        let mut manager = EntityManager::new();
        let system = LandscapeEventSystem::new();
        let queue = system.queue();
        manager.register_system("landscapeEvents", system).unwrap();
        (manager, queue)
    }

    fn recorder(manager: &mut EntityManager, recorder: Recorder) -> (Entity, ComponentId) {
        let entity = manager.create(None);
        let id = attach_handler(manager, entity, recorder).unwrap();
        manager.add(entity);
        (entity, id)
    }

    fn names(log: &Log) -> Vec<&'static str> {
        log.borrow().iter().map(|(name, _)| *name).collect()
    }

    fn region() -> GeneratorEvent {
        GeneratorEvent::generated(Vec3::new(10.0, 0.0, 10.0), Vec3::splat(5.0))
    }

    #[test]
    fn duplicate_generated_events_spawn_once() {
        let (mut manager, queue) = setup();
        spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();

        queue.push(region());
        queue.push(region());
        manager.update(0.016);

        let anchors = manager.get_components(REGION_ANCHOR);
        assert_eq!(anchors.len(), 1);
        let anchor = manager.component::<crate::RegionAnchor>(anchors[0]).unwrap();
        assert_eq!(anchor.position, Vec3::new(10.0, 0.0, 10.0));
        assert!(queue.is_empty());
    }

    #[test]
    fn distinct_positions_spawn_twice() {
        let (mut manager, queue) = setup();
        spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new()).unwrap();

        queue.push(region());
        queue.push(GeneratorEvent::generated(Vec3::new(-10.0, 0.0, 10.0), Vec3::splat(5.0)));
        manager.update(0.016);

        assert_eq!(manager.get_components(REGION_ANCHOR).len(), 2);
    }

    #[test]
    fn handlers_run_in_registration_order_per_event() {
        let (mut manager, queue) = setup();
        let log = Log::default();
        recorder(&mut manager, Recorder::new("h1", &log));
        recorder(&mut manager, Recorder::new("h2", &log));

        let started = GeneratorEvent::started(Vec3::ZERO, Vec3::splat(80.0));
        queue.push(started);
        queue.push(region());
        manager.update(0.016);

        assert_eq!(names(&log), vec!["h1", "h2", "h1", "h2"]);
        assert_eq!(log.borrow()[0].1, started);
        assert_eq!(log.borrow()[2].1, region());
    }

    #[test]
    fn dispatch_count_covers_every_handler_call() {
        let mut manager = EntityManager::new();
        let mut system = LandscapeEventSystem::new();
        let queue = system.queue();
        let log = Log::default();
        let (doomed, _) = recorder(&mut manager, Recorder::new("doomed", &log));
        recorder(&mut manager, Recorder::new("h1", &log));
        recorder(&mut manager, Recorder::new("h2", &log));

        system.update(&mut manager, 0.016);
        assert_eq!(system.dispatched(), 0);

        queue.push(region());
        queue.push(region());
        manager.remove(doomed);
        system.update(&mut manager, 0.016);

        assert_eq!(system.dispatched(), 4);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn removed_handler_is_skipped() {
        let (mut manager, queue) = setup();
        let log = Log::default();
        let (doomed, _) = recorder(&mut manager, Recorder::new("doomed", &log));
        recorder(&mut manager, Recorder::new("survivor", &log));

        queue.push(region());
        manager.remove(doomed);
        manager.update(0.016);

        assert_eq!(names(&log), vec!["survivor"]);
    }

    #[test]
    fn handler_removed_mid_dispatch_is_skipped() {
        let (mut manager, queue) = setup();
        let log = Log::default();

        let victim = manager.create(None);
        let mut killer = Recorder::new("killer", &log);
        killer.remove_on_event = Some(victim);
        recorder(&mut manager, killer);

        attach_handler(&mut manager, victim, Recorder::new("victim", &log)).unwrap();
        manager.add(victim);

        queue.push(region());
        manager.update(0.016);

        assert_eq!(names(&log), vec!["killer"]);
        assert!(!manager.exists(victim));
    }

    #[test]
    fn handler_removing_its_own_owner_is_dropped_cleanly() {
        let (mut manager, queue) = setup();
        let log = Log::default();

        let owner = manager.create(None);
        let mut suicidal = Recorder::new("self", &log);
        suicidal.remove_on_event = Some(owner);
        attach_handler(&mut manager, owner, suicidal).unwrap();
        manager.add(owner);

        queue.push(region());
        queue.push(region());
        manager.update(0.016);

        assert_eq!(names(&log), vec!["self"]);
        assert!(manager.get_components(GENERATOR_EVENT_HANDLER).is_empty());
    }

    #[test]
    fn events_pushed_during_dispatch_wait_for_next_frame() {
        let (mut manager, queue) = setup();
        let log = Log::default();
        let mut echo = Recorder::new("echo", &log);
        echo.push_on_event = Some(Arc::clone(&queue));
        recorder(&mut manager, echo);

        queue.push(region());
        manager.update(0.016);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(queue.len(), 1);

        manager.update(0.016);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(log.borrow()[1].1.kind, crate::GeneratorEventKind::Deleted);
        assert!(queue.is_empty());
    }

    #[test]
    fn staged_handlers_are_not_dispatched() {
        let (mut manager, queue) = setup();
        let log = Log::default();
        let staged = manager.create(None);
        attach_handler(&mut manager, staged, Recorder::new("staged", &log)).unwrap();

        queue.push(region());
        manager.update(0.016);
        assert!(log.borrow().is_empty());

        manager.add(staged);
        queue.push(region());
        manager.update(0.016);
        assert_eq!(names(&log), vec!["staged"]);
    }

    #[test]
    fn impostor_components_are_not_dispatched() {
        let (mut manager, queue) = setup();
        let log = Log::default();

        let odd = manager.create(None);
        manager.attach(odd, Impostor);
        manager.add(odd);
        recorder(&mut manager, Recorder::new("real", &log));

        queue.push(region());
        manager.update(0.016);

        assert_eq!(names(&log), vec!["real"]);
    }

    #[test]
    fn empty_frames_do_nothing() {
        let (mut manager, _queue) = setup();
        let log = Log::default();
        recorder(&mut manager, Recorder::new("idle", &log));

        manager.update(0.016);
        manager.update(0.016);
        assert!(log.borrow().is_empty());
    }
}
