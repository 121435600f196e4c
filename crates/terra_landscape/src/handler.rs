//! Generation handler components
//!
//! Every handler is stored as a [`GeneratorEventHandler`] component so the
//! event system can find it by capability name and downcast it to one
//! known type. The behaviour itself lives behind [`HandleGeneratorEvent`].

use crate::event::GeneratorEvent;
use std::any::Any;
use terra_core::ecs::{Component, ComponentId, Entity, EntityManager};

/// Capability offered by every generation handler.
pub const GENERATOR_EVENT_HANDLER: &str = "generatorEventHandler";

pub trait HandleGeneratorEvent: Any {
    /// React to one event on the simulation thread.
    fn handle_event(&mut self, manager: &mut EntityManager, owner: Entity, event: &GeneratorEvent);

    /// Capability names offered in addition to the handler capability.
    fn extra_capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub struct GeneratorEventHandler {
    handler: Box<dyn HandleGeneratorEvent>,
}

impl GeneratorEventHandler {
    pub fn new<H: HandleGeneratorEvent>(handler: H) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    pub fn handle_event(&mut self, manager: &mut EntityManager, owner: Entity, event: &GeneratorEvent) {
        self.handler.handle_event(manager, owner, event);
    }

    /// The wrapped handler, if it is an `H`.
    pub fn handler<H: HandleGeneratorEvent>(&self) -> Option<&H> {
        self.handler.as_any().downcast_ref::<H>()
    }

    pub fn handler_mut<H: HandleGeneratorEvent>(&mut self) -> Option<&mut H> {
        self.handler.as_any_mut().downcast_mut::<H>()
    }
}

impl Component for GeneratorEventHandler {
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

/// Attach `handler` to `entity`, registering its extra capabilities too.
pub fn attach_handler<H: HandleGeneratorEvent>(
    manager: &mut EntityManager,
    entity: Entity,
    handler: H,
) -> Option<ComponentId> {
    let extra = handler.extra_capabilities();
    let id = manager.attach(entity, GeneratorEventHandler::new(handler))?;
    for name in extra {
        manager.register(id, name);
    }
    Some(id)
}

/// Logs every event it sees and does nothing else.
#[derive(Debug, Default)]
pub struct EventLogger {
    seen: u64,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl HandleGeneratorEvent for EventLogger {
    fn handle_event(&mut self, _manager: &mut EntityManager, owner: Entity, event: &GeneratorEvent) {
        self.seen += 1;
        tracing::debug!(
            %owner,
            kind = %event.kind,
            position = ?event.position,
            extent = ?event.extent,
            "generator event"
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
