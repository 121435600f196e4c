//! Input dispatch
//!
//! The platform layer pushes [`InputEvent`]s into a mailbox; once per
//! frame [`InputHandlerSystem`] drains it and offers every event to every
//! live `"inputHandler"` component, in registration order.

use std::any::Any;
use std::sync::Arc;
use terra_core::ecs::{Component, ComponentId, Entity, EntityManager, System};
use terra_core::mailbox::Mailbox;
use terra_services::InputEvent;

pub const INPUT_HANDLER: &str = "inputHandler";

pub trait HandleInput: Any {
    fn handle_input(&mut self, manager: &mut EntityManager, owner: Entity, event: &InputEvent);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub struct InputHandler {
    handler: Box<dyn HandleInput>,
}

impl InputHandler {
    pub fn new<H: HandleInput>(handler: H) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    pub fn handler<H: HandleInput>(&self) -> Option<&H> {
        self.handler.as_any().downcast_ref::<H>()
    }

    pub fn handler_mut<H: HandleInput>(&mut self) -> Option<&mut H> {
        self.handler.as_any_mut().downcast_mut::<H>()
    }
}

impl Component for InputHandler {
    fn capabilities(&self) -> &'static [&'static str] {
        &[INPUT_HANDLER]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn attach_input_handler<H: HandleInput>(
    manager: &mut EntityManager,
    entity: Entity,
    handler: H,
) -> Option<ComponentId> {
    manager.attach(entity, InputHandler::new(handler))
}

pub struct InputHandlerSystem {
    events: Arc<Mailbox<InputEvent>>,
}

impl InputHandlerSystem {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mailbox::new()),
        }
    }

    /// Producer side, for the platform layer.
    pub fn events(&self) -> Arc<Mailbox<InputEvent>> {
        Arc::clone(&self.events)
    }
}

impl Default for InputHandlerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InputHandlerSystem {
    fn update(&mut self, manager: &mut EntityManager, _delta: f32) {
        for event in self.events.drain() {
            for id in manager.get_components(INPUT_HANDLER) {
                if manager.resolve(id).is_none() {
                    continue;
                }
                manager.with_component::<InputHandler, _, _>(id, |input, manager, owner| {
                    input.handler.handle_input(manager, owner, &event)
                });
            }
        }
    }
}
