//! Configuration file support for physbox.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/physbox/config.toml`. Settings include the simulation scale and
//! rate, body material, joint tuning, colors, and keybindings.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{
    JointsConfig, MaterialConfig, RenderConfig, RollMotorConfig, SimulationConfig, ToolsConfig,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [simulation]
/// frame_rate = 60.0
/// gravity = [0.0, -9.81]
///
/// [material]
/// restitution = 0.4
///
/// [render]
/// background = [30, 30, 30]
/// body_color = "white"
///
/// [keybindings]
/// select_grab = ["Ctrl+G", "G"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Frame rate, world scale and gravity
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Material shared by every shape tool
    #[serde(default)]
    pub material: MaterialConfig,

    /// Roll tool annotation
    #[serde(default)]
    pub roll_motor: RollMotorConfig,

    /// Joint tuning
    #[serde(default)]
    pub joints: JointsConfig,

    /// Tool preferences
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Colors and cursor
    #[serde(default)]
    pub render: RenderConfig,

    /// Hotkeys
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

/// Clamps `value` into `range`, warning when it was outside.
fn clamp_field(name: &str, value: &mut f64, min: f64, max: f64) {
    let current = *value;
    if !(min..=max).contains(&current) {
        warn!("Invalid {name} {current:.2}, clamping to {min}-{max} range");
        *value = if current.is_nan() {
            min
        } else {
            current.clamp(min, max)
        };
    }
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value (or reset to
    /// their default) and a warning is logged.
    ///
    /// Validated ranges:
    /// - `simulation.frame_rate`: 1 - 120
    /// - `simulation.pixels_per_meter`: 5 - 500
    /// - `material.density`: 0.01 - 100
    /// - `material.restitution`: 0 - 1
    /// - `material.friction`: 0 - 10
    /// - `roll_motor.strength`: 0 - 1000
    /// - joint stiffness and damping: non-negative
    pub fn validate_and_clamp(&mut self) {
        let sim = &mut self.simulation;
        clamp_field("frame_rate", &mut sim.frame_rate, 1.0, 120.0);
        clamp_field("pixels_per_meter", &mut sim.pixels_per_meter, 5.0, 500.0);
        if sim.gravity.iter().any(|g| !g.is_finite()) {
            warn!("Invalid gravity {:?}, using [0.0, -10.0]", sim.gravity);
            sim.gravity = SimulationConfig::default().gravity;
        }

        let material = &mut self.material;
        clamp_field("density", &mut material.density, 0.01, 100.0);
        clamp_field("restitution", &mut material.restitution, 0.0, 1.0);
        clamp_field("friction", &mut material.friction, 0.0, 10.0);

        clamp_field("roll_motor.strength", &mut self.roll_motor.strength, 0.0, 1000.0);
        if !self.roll_motor.target_velocity.is_finite() {
            warn!("Invalid roll_motor.target_velocity, using default");
            self.roll_motor.target_velocity = RollMotorConfig::default().target_velocity;
        }

        let joints = &mut self.joints;
        clamp_field("motor_speed", &mut joints.motor_speed, -100.0, 100.0);
        clamp_field("distance_stiffness", &mut joints.distance_stiffness, 0.0, 1e6);
        clamp_field("distance_damping", &mut joints.distance_damping, 0.0, 1e6);
        clamp_field("pointer_stiffness", &mut joints.pointer_stiffness, 0.0, 1e6);
        clamp_field("pointer_damping", &mut joints.pointer_damping, 0.0, 1e6);

        if self
            .tools
            .default_tool
            .parse::<crate::input::tools::ToolKind>()
            .is_err()
        {
            warn!(
                "Invalid default_tool '{}', falling back to 'magicpen'",
                self.tools.default_tool
            );
            self.tools.default_tool = ToolsConfig::default().default_tool;
        }

        let render = &self.render;
        for (name, spec) in [
            ("background", &render.background),
            ("overlay_color", &render.overlay_color),
            ("erase_color", &render.erase_color),
            ("body_color", &render.body_color),
            ("static_color", &render.static_color),
            ("joint_color", &render.joint_color),
        ] {
            if !spec.is_valid() {
                warn!("Unknown color {spec:?} for render.{name}, black will be used");
            }
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/physbox/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("physbox");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `path`, or returns defaults if the file does not exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Writes the configuration to `config_path`, creating the parent directory.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Writes the documented example config (`config.example.toml`) to `config_path`.
    ///
    /// # Errors
    /// Returns an error if a file already exists at the target path, or the
    /// directory or file cannot be written.
    pub fn create_default_file(config_path: &Path) -> Result<()> {
        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(config_path, default_config)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Created default config at {}", config_path.display());
        Ok(())
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
