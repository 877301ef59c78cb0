//! Simulation settings and validation
//!
//! Loaded from a JSON file when one is given; a missing or unreadable file
//! falls back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAIN_OBJECT_SPEED_MAX, MAIN_OBJECT_SPEED_MIN};
use crate::sim::collision::CollisionPolicy;

/// Rejected configuration, reported at init instead of silently no-opping
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("spawn radius must be positive, got {0}")]
    SpawnRadius(f32),
    #[error("main object speed must be within 1..=100, got {0}")]
    MainObjectSpeed(f32),
    #[error("update interval must not be negative, got {0}")]
    UpdateInterval(f32),
    #[error("at least one racer kind is required")]
    NoKinds,
    #[error("collision probability for `{kind}` must be within 0..=1, got {got}")]
    CollisionProbability { kind: String, got: f32 },
    #[error("at least one waypoint is required")]
    NoWaypoints,
}

/// Per-kind tuning, the analog of picking a prefab at spawn time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacerKind {
    pub name: String,
    /// Chance this kind registers a hit under the probabilistic policy (0-1)
    pub collision_probability: f32,
}

impl RacerKind {
    pub fn new(name: impl Into<String>, collision_probability: f32) -> Self {
        Self {
            name: name.into(),
            collision_probability,
        }
    }
}

/// Simulation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Population dealt out at init
    pub initial_racers: u32,
    /// Radius of the spherical spawn volume
    pub spawn_radius: f32,
    /// Per-racer busy window between effective updates, in seconds
    pub update_interval_secs: f32,
    /// Main object travel speed, units per second
    pub main_object_speed: f32,
    /// How racer pairs are judged to have collided
    pub collision_policy: CollisionPolicy,
    /// Kind table; spawns pick one at random
    pub kinds: Vec<RacerKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_racers: 100,
            spawn_radius: 100.0,
            update_interval_secs: 5.0,
            main_object_speed: 10.0,
            collision_policy: CollisionPolicy::default(),
            kinds: vec![
                RacerKind::new("sprinter", 0.002),
                RacerKind::new("cruiser", 0.005),
                RacerKind::new("bruiser", 0.01),
            ],
        }
    }
}

impl Settings {
    /// Fail fast on configuration a run could not recover from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_radius <= 0.0 {
            return Err(ConfigError::SpawnRadius(self.spawn_radius));
        }
        if !(MAIN_OBJECT_SPEED_MIN..=MAIN_OBJECT_SPEED_MAX).contains(&self.main_object_speed) {
            return Err(ConfigError::MainObjectSpeed(self.main_object_speed));
        }
        if self.update_interval_secs < 0.0 {
            return Err(ConfigError::UpdateInterval(self.update_interval_secs));
        }
        if self.kinds.is_empty() {
            return Err(ConfigError::NoKinds);
        }
        for kind in &self.kinds {
            if !(0.0..=1.0).contains(&kind.collision_probability) {
                return Err(ConfigError::CollisionProbability {
                    kind: kind.name.clone(),
                    got: kind.collision_probability,
                });
            }
        }
        Ok(())
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("loaded settings from {}", path.display());
                        return settings;
                    }
                    Err(err) => {
                        log::warn!("bad settings file {}: {err}", path.display());
                    }
                },
                Err(err) => {
                    log::warn!("could not read {}: {err}", path.display());
                }
            }
        }
        log::info!("using default settings");
        Self::default()
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }
}
