//! Terra Services Layer
//!
//! Platform-facing pieces the simulation consumes: input events and
//! settings.

pub mod input;
pub mod settings;

pub use input::{ButtonState, InputEvent, InputKind};
pub use settings::{
    LandscapeSettings, Settings, SettingsError, SimulationSettings, SpawnerSettings,
};
