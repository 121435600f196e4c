//! Input events as delivered by the platform layer
//!
//! Device mapping happens upstream; by the time an event gets here it is
//! already an abstract action with an edge state.

use terra_core::glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PrimaryAction,
    SecondaryAction,
    Move,
    Look,
}

/// Edge state of a button-like input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Went down this frame.
    Pressed,
    /// Still down from an earlier frame.
    Held,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub state: ButtonState,
    /// Direction or axis payload; zero for plain buttons.
    pub data: Vec3,
}

impl InputEvent {
    pub fn new(kind: InputKind, state: ButtonState) -> Self {
        Self {
            kind,
            state,
            data: Vec3::ZERO,
        }
    }

    pub fn pressed(kind: InputKind) -> Self {
        Self::new(kind, ButtonState::Pressed)
    }

    pub fn with_data(mut self, data: Vec3) -> Self {
        self.data = data;
        self
    }

    /// Pressed this frame, not held over from before.
    pub fn is_activation(&self, kind: InputKind) -> bool {
        self.kind == kind && self.state == ButtonState::Pressed
    }
}
