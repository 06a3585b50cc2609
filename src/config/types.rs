//! Configuration type definitions.

use super::enums::ColorSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Simulation settings.
///
/// Controls the physics world and the frame loop.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SimulationConfig {
    /// Frames (and physics steps) per second (valid range: 1 - 120)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Scale between screen pixels and world meters (valid range: 5 - 500)
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f64,

    /// Gravity as `[x, y]` in m/s², y pointing up
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 2],

    /// Start with the simulation paused
    #[serde(default)]
    pub start_paused: bool,

    /// Sleep out the remainder of each frame to hold the frame rate.
    /// Disable for batch rendering.
    #[serde(default = "default_throttle")]
    pub throttle: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            pixels_per_meter: default_pixels_per_meter(),
            gravity: default_gravity(),
            start_paused: false,
            throttle: default_throttle(),
        }
    }
}

/// Material of every body created by a shape tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MaterialConfig {
    /// Mass per unit area (valid range: 0.01 - 100.0)
    #[serde(default = "default_density")]
    pub density: f64,

    /// Bounciness (valid range: 0.0 - 1.0)
    #[serde(default = "default_restitution")]
    pub restitution: f64,

    /// Friction coefficient (valid range: 0.0 - 10.0)
    #[serde(default = "default_friction")]
    pub friction: f64,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            restitution: default_restitution(),
            friction: default_friction(),
        }
    }
}

/// Roll-motor annotation attached by the roll tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RollMotorConfig {
    /// Target angular velocity in rad/s; negative rolls clockwise on screen
    #[serde(default = "default_roll_velocity")]
    pub target_velocity: f64,

    /// How hard the body is pushed towards the target (valid range: 0.0 - 1000.0)
    #[serde(default = "default_roll_strength")]
    pub strength: f64,
}

impl Default for RollMotorConfig {
    fn default() -> Self {
        Self {
            target_velocity: default_roll_velocity(),
            strength: default_roll_strength(),
        }
    }
}

/// Joint tuning.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JointsConfig {
    /// Angular speed of motor joints in rad/s
    #[serde(default = "default_motor_speed")]
    pub motor_speed: f64,

    /// Spring stiffness of distance joints
    #[serde(default = "default_distance_stiffness")]
    pub distance_stiffness: f64,

    /// Spring damping of distance joints
    #[serde(default = "default_distance_damping")]
    pub distance_damping: f64,

    /// Spring stiffness of the grab tool's pointer joint
    #[serde(default = "default_pointer_stiffness")]
    pub pointer_stiffness: f64,

    /// Spring damping of the grab tool's pointer joint
    #[serde(default = "default_pointer_damping")]
    pub pointer_damping: f64,
}

impl Default for JointsConfig {
    fn default() -> Self {
        Self {
            motor_speed: default_motor_speed(),
            distance_stiffness: default_distance_stiffness(),
            distance_damping: default_distance_damping(),
            pointer_stiffness: default_pointer_stiffness(),
            pointer_damping: default_pointer_damping(),
        }
    }
}

/// Tool preferences.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolsConfig {
    /// Tool active at startup (magicpen, circle, triangle, box, polygon, grab,
    /// motor, pin, joint, roll, destroy)
    #[serde(default = "default_tool")]
    pub default_tool: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_tool: default_tool(),
        }
    }
}

/// Colors and on-screen elements.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderConfig {
    /// Canvas clear color
    #[serde(default = "default_background")]
    pub background: ColorSpec,

    /// Color of in-progress gestures
    #[serde(default = "default_overlay_color")]
    pub overlay_color: ColorSpec,

    /// Color of the destroy tool's trail
    #[serde(default = "default_erase_color")]
    pub erase_color: ColorSpec,

    /// Outline color of dynamic bodies
    #[serde(default = "default_body_color")]
    pub body_color: ColorSpec,

    /// Outline color of static bodies
    #[serde(default = "default_static_color")]
    pub static_color: ColorSpec,

    /// Color of joint lines
    #[serde(default = "default_joint_color")]
    pub joint_color: ColorSpec,

    /// Draw a software cursor while the pointer is over the canvas
    #[serde(default = "default_show_cursor")]
    pub show_cursor: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            overlay_color: default_overlay_color(),
            erase_color: default_erase_color(),
            body_color: default_body_color(),
            static_color: default_static_color(),
            joint_color: default_joint_color(),
            show_cursor: default_show_cursor(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_frame_rate() -> f64 {
    30.0
}

fn default_pixels_per_meter() -> f64 {
    50.0
}

fn default_gravity() -> [f64; 2] {
    [0.0, -10.0]
}

fn default_throttle() -> bool {
    true
}

fn default_density() -> f64 {
    1.0
}

fn default_restitution() -> f64 {
    0.16
}

fn default_friction() -> f64 {
    0.5
}

fn default_roll_velocity() -> f64 {
    -10.0
}

fn default_roll_strength() -> f64 {
    40.0
}

fn default_motor_speed() -> f64 {
    5.0
}

fn default_distance_stiffness() -> f64 {
    400.0
}

fn default_distance_damping() -> f64 {
    10.0
}

fn default_pointer_stiffness() -> f64 {
    250.0
}

fn default_pointer_damping() -> f64 {
    15.0
}

fn default_tool() -> String {
    "magicpen".to_string()
}

fn default_background() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_overlay_color() -> ColorSpec {
    ColorSpec::Name("sky".to_string())
}

fn default_erase_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_body_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_static_color() -> ColorSpec {
    ColorSpec::Name("grey".to_string())
}

fn default_joint_color() -> ColorSpec {
    ColorSpec::Name("orange".to_string())
}

fn default_show_cursor() -> bool {
    true
}
