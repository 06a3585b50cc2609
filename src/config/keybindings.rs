//! Keybinding configuration types and parsing.
//!
//! Global hotkeys pause the simulation or switch tools. Users can rebind them
//! in the `[keybindings]` section of config.toml.

use crate::input::tools::ToolKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Simulation control
    TogglePause,

    // Tool selection
    SelectCircle,
    SelectBox,
    SelectTriangle,
    SelectPolygon,
    SelectMagicPen,
    SelectGrab,
    SelectJoint,
    SelectPin,
    SelectMotor,
    SelectRoll,
    SelectDestroy,
}

impl Action {
    /// Tool selected by this action, if it is a tool action.
    pub fn tool(self) -> Option<ToolKind> {
        match self {
            Action::TogglePause => None,
            Action::SelectCircle => Some(ToolKind::Circle),
            Action::SelectBox => Some(ToolKind::Box),
            Action::SelectTriangle => Some(ToolKind::Triangle),
            Action::SelectPolygon => Some(ToolKind::Polygon),
            Action::SelectMagicPen => Some(ToolKind::MagicPen),
            Action::SelectGrab => Some(ToolKind::Grab),
            Action::SelectJoint => Some(ToolKind::Joint),
            Action::SelectPin => Some(ToolKind::Pin),
            Action::SelectMotor => Some(ToolKind::Motor),
            Action::SelectRoll => Some(ToolKind::Roll),
            Action::SelectDestroy => Some(ToolKind::Destroy),
        }
    }
}

/// A single keybinding: a key name with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+W" or "Space".
    /// Modifiers can appear in any order and spaces around '+' are allowed.
    /// Key names are stored lowercase, so "Ctrl+C" and "ctrl+c" are the same binding.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into ["Ctrl", "", ""]; the key itself is '+'
        let key = key_parts.join("+").to_lowercase();
        let key = if key.is_empty() { "+".to_string() } else { key };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Parsed keybindings, ready for lookups.
pub type ActionMap = HashMap<KeyBinding, Action>;

/// Finds the action bound to a key press.
pub fn lookup_action(map: &ActionMap, key: &str, ctrl: bool, shift: bool, alt: bool) -> Option<Action> {
    map.iter()
        .find(|(binding, _)| binding.matches(key, ctrl, shift, alt))
        .map(|(_, action)| *action)
}

/// Configuration for all keybindings.
///
/// Each action can have multiple keybindings:
/// ```toml
/// [keybindings]
/// toggle_pause = ["Space", "Ctrl+Space"]
/// select_circle = ["Ctrl+C"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_toggle_pause")]
    pub toggle_pause: Vec<String>,

    #[serde(default = "default_select_circle")]
    pub select_circle: Vec<String>,

    #[serde(default = "default_select_box")]
    pub select_box: Vec<String>,

    #[serde(default = "default_select_triangle")]
    pub select_triangle: Vec<String>,

    #[serde(default = "default_select_polygon")]
    pub select_polygon: Vec<String>,

    #[serde(default = "default_select_magic_pen")]
    pub select_magic_pen: Vec<String>,

    #[serde(default = "default_select_grab")]
    pub select_grab: Vec<String>,

    #[serde(default = "default_select_joint")]
    pub select_joint: Vec<String>,

    #[serde(default = "default_select_pin")]
    pub select_pin: Vec<String>,

    #[serde(default = "default_select_motor")]
    pub select_motor: Vec<String>,

    #[serde(default = "default_select_roll")]
    pub select_roll: Vec<String>,

    #[serde(default = "default_select_destroy")]
    pub select_destroy: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            toggle_pause: default_toggle_pause(),
            select_circle: default_select_circle(),
            select_box: default_select_box(),
            select_triangle: default_select_triangle(),
            select_polygon: default_select_polygon(),
            select_magic_pen: default_select_magic_pen(),
            select_grab: default_select_grab(),
            select_joint: default_select_joint(),
            select_pin: default_select_pin(),
            select_motor: default_select_motor(),
            select_roll: default_select_roll(),
            select_destroy: default_select_destroy(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to actions.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<ActionMap, String> {
        let mut map = HashMap::new();

        let mut insert_binding = |binding_str: &str, action: Action| -> Result<(), String> {
            let binding = KeyBinding::parse(binding_str)?;
            if let Some(existing_action) = map.insert(binding, action) {
                return Err(format!(
                    "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                    binding_str, existing_action, action
                ));
            }
            Ok(())
        };

        let table: [(&Vec<String>, Action); 12] = [
            (&self.toggle_pause, Action::TogglePause),
            (&self.select_circle, Action::SelectCircle),
            (&self.select_box, Action::SelectBox),
            (&self.select_triangle, Action::SelectTriangle),
            (&self.select_polygon, Action::SelectPolygon),
            (&self.select_magic_pen, Action::SelectMagicPen),
            (&self.select_grab, Action::SelectGrab),
            (&self.select_joint, Action::SelectJoint),
            (&self.select_pin, Action::SelectPin),
            (&self.select_motor, Action::SelectMotor),
            (&self.select_roll, Action::SelectRoll),
            (&self.select_destroy, Action::SelectDestroy),
        ];

        for (bindings, action) in table {
            for binding_str in bindings {
                insert_binding(binding_str, action)?;
            }
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions
// =============================================================================

fn default_toggle_pause() -> Vec<String> {
    vec!["Space".to_string()]
}

fn default_select_circle() -> Vec<String> {
    vec!["Ctrl+C".to_string()]
}

fn default_select_box() -> Vec<String> {
    vec!["Ctrl+B".to_string()]
}

fn default_select_triangle() -> Vec<String> {
    vec!["Ctrl+T".to_string()]
}

fn default_select_polygon() -> Vec<String> {
    vec!["Ctrl+P".to_string()]
}

fn default_select_magic_pen() -> Vec<String> {
    vec!["Ctrl+D".to_string()]
}

fn default_select_grab() -> Vec<String> {
    vec!["Ctrl+G".to_string()]
}

fn default_select_joint() -> Vec<String> {
    vec!["Ctrl+J".to_string()]
}

fn default_select_pin() -> Vec<String> {
    vec!["Ctrl+O".to_string()]
}

fn default_select_motor() -> Vec<String> {
    vec!["Ctrl+M".to_string()]
}

fn default_select_roll() -> Vec<String> {
    vec!["Ctrl+R".to_string()]
}

fn default_select_destroy() -> Vec<String> {
    vec!["Ctrl+E".to_string()]
}
