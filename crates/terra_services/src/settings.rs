//! Settings management
//!
//! Loaded from JSON. Every field has a default, so a file only needs the
//! values it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Largest accepted `view_radius`. Keeps tile coordinates around the focus
/// inside `i32` and the per-pass tile count bounded.
pub const MAX_VIEW_RADIUS: u32 = 32;

/// Largest accepted `samples_per_side`.
pub const MAX_SAMPLES_PER_SIDE: u32 = 1025;

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite number above zero, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and not negative, got {value}")))
    }
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub landscape: LandscapeSettings,
    pub spawner: SpawnerSettings,
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeSettings {
    /// Edge length of one square tile, in world units.
    pub tile_size: f32,
    /// Tiles kept around the focus tile in each direction.
    pub view_radius: u32,
    /// Height samples along one tile edge.
    pub samples_per_side: u32,
    pub height_scale: f32,
    pub seed: u64,
    /// Background generation threads; 0 picks one per core.
    pub worker_threads: usize,
}

impl LandscapeSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("landscape.tile_size", self.tile_size)?;
        non_negative("landscape.height_scale", self.height_scale)?;
        if self.view_radius > MAX_VIEW_RADIUS {
            return Err(invalid(
                "landscape.view_radius",
                format!("{} exceeds the limit of {MAX_VIEW_RADIUS}", self.view_radius),
            ));
        }
        if !(2..=MAX_SAMPLES_PER_SIDE).contains(&self.samples_per_side) {
            return Err(invalid(
                "landscape.samples_per_side",
                format!(
                    "{} is outside 2..={MAX_SAMPLES_PER_SIDE}",
                    self.samples_per_side
                ),
            ));
        }
        Ok(())
    }
}

impl Default for LandscapeSettings {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            view_radius: 2,
            samples_per_side: 17,
            height_scale: 12.0,
            seed: 0x7e77a,
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Distance in front of the spawner where projectiles appear.
    pub muzzle_distance: f32,
    pub launch_speed: f32,
    /// Seconds before a projectile is removed.
    pub projectile_lifetime: f32,
    pub model_source: String,
    pub model_scale: f32,
    pub light_radius: f32,
    pub light_intensity: f32,
}

impl SpawnerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        non_negative("spawner.muzzle_distance", self.muzzle_distance)?;
        non_negative("spawner.launch_speed", self.launch_speed)?;
        non_negative("spawner.projectile_lifetime", self.projectile_lifetime)?;
        positive("spawner.model_scale", self.model_scale)?;
        non_negative("spawner.light_radius", self.light_radius)?;
        non_negative("spawner.light_intensity", self.light_intensity)
    }
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            muzzle_distance: 2.0,
            launch_speed: 40.0,
            projectile_lifetime: 5.0,
            model_source: "assets/obj/smoothcube.glb".to_string(),
            model_scale: 0.25,
            light_radius: 0.15,
            light_intensity: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Frames the headless runtime runs before exiting.
    pub frames: u64,
    /// Frames between scripted primary-action presses; 0 disables them.
    pub fire_interval: u64,
    /// Player walking speed in world units per second.
    pub walk_speed: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            fire_interval: 30,
            walk_speed: 8.0,
        }
    }
}

impl Settings {
    /// Parse and validate. Values that would break generation or spawning
    /// are rejected here rather than at first use.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.landscape.validate()?;
        self.spawner.validate()?;
        non_negative("simulation.walk_speed", self.simulation.walk_speed)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
