//! Playground configuration
//!
//! Everything the composition root needs (window, physics, the player actor,
//! control tuning and the static level pieces) lives here. `Default` matches
//! the classic 800x600 layout; a JSON file named by `PLAYGROUND_CONFIG` can
//! override any subset of fields.

use std::env;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Color;

/// Environment variable holding an optional JSON config path
pub const CONFIG_ENV_VAR: &str = "PLAYGROUND_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Impulse Playground".to_string(),
            clear_color: Color::BLACK,
        }
    }
}

/// Simulation constants. Fixed for the lifetime of a `SimulationWorld`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity in pixels/s^2, +y points down the screen
    pub gravity: Vec2,
    /// Seconds advanced per step
    pub timestep: f32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 9.8),
            timestep: 1.0 / 60.0,
            velocity_iterations: 6,
            position_iterations: 2,
        }
    }
}

/// Body and visual parameters of the controllable actor
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub spawn: Vec2,
    pub size: Vec2,
    pub density: f32,
    pub friction: f32,
    pub base_color: Color,
    pub highlight_color: Color,
    pub outline_color: Color,
    pub outline_thickness: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(400.0, 50.0),
            size: Vec2::new(20.0, 20.0),
            density: 0.1,
            friction: 0.1,
            base_color: Color::RED,
            highlight_color: Color::YELLOW,
            outline_color: Color::RED,
            outline_thickness: 1.0,
        }
    }
}

/// Target velocities for keyboard control (pixels/s)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Vertical velocity after a jump; negative is up
    pub jump_velocity: f32,
    /// Horizontal speed while left/right is held
    pub move_speed: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            jump_velocity: -20.0,
            move_speed: 5.0,
        }
    }
}

/// Collision shape of a static level piece, in body-local coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneryShape {
    Box { half_extents: Vec2 },
    Edge { from: Vec2, to: Vec2 },
}

/// Visual rectangle of a level piece. Positioned on its own, not derived
/// from the body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneryVisual {
    pub position: Vec2,
    pub size: Vec2,
    pub centered: bool,
    pub fill: Color,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneryConfig {
    pub name: String,
    pub body_position: Vec2,
    pub shape: SceneryShape,
    #[serde(default = "default_scenery_density")]
    pub density: f32,
    #[serde(default = "default_scenery_friction")]
    pub friction: f32,
    pub visual: SceneryVisual,
}

fn default_scenery_density() -> f32 {
    1.0
}

fn default_scenery_friction() -> f32 {
    0.2
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub pieces: Vec<SceneryConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            pieces: vec![
                SceneryConfig {
                    name: "ground".to_string(),
                    body_position: Vec2::new(300.0, 300.0),
                    shape: SceneryShape::Box { half_extents: Vec2::new(150.0, 50.0) },
                    density: default_scenery_density(),
                    friction: default_scenery_friction(),
                    visual: SceneryVisual {
                        position: Vec2::new(300.0, 300.0),
                        size: Vec2::new(300.0, 100.0),
                        centered: true,
                        fill: Color::WHITE,
                    },
                },
                SceneryConfig {
                    name: "ledge".to_string(),
                    body_position: Vec2::new(600.0, 300.0),
                    shape: SceneryShape::Edge {
                        from: Vec2::ZERO,
                        to: Vec2::new(30.0, 0.0),
                    },
                    density: default_scenery_density(),
                    friction: default_scenery_friction(),
                    visual: SceneryVisual {
                        position: Vec2::new(600.0, 300.0),
                        size: Vec2::new(30.0, 1.0),
                        centered: false,
                        fill: Color::GREEN,
                    },
                },
            ],
        }
    }
}

/// Root configuration handed to `FrameLoop::new`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub actor: ActorConfig,
    pub control: ControlConfig,
    pub level: LevelConfig,
}

impl PlaygroundConfig {
    /// Defaults, overridden by the file named in `PLAYGROUND_CONFIG` if set
    pub fn load() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), "loaded playground config");
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
