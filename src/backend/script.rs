//! TOML event scripts for the headless backend.
//!
//! ```toml
//! frames = 60
//!
//! [[at]]
//! frame = 0
//! events = [
//!   { event = "tool", name = "circle" },
//!   { event = "down", x = 100, y = 100 },
//!   { event = "move", x = 140, y = 100, primary = true },
//!   { event = "up", x = 140, y = 100 },
//! ]
//! ```

use crate::input::events::{ButtonMask, Event, MouseButton};
use crate::input::tools::ToolKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_FRAMES: u64 = 60;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid event at frame {frame}: {reason}")]
    InvalidEvent { frame: u64, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl From<ScriptButton> for MouseButton {
    fn from(button: ScriptButton) -> Self {
        match button {
            ScriptButton::Left => MouseButton::Left,
            ScriptButton::Right => MouseButton::Right,
            ScriptButton::Middle => MouseButton::Middle,
        }
    }
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Tool {
        name: String,
    },
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ScriptButton,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ScriptButton,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        primary: bool,
    },
    Enter,
    Leave,
    FocusIn,
    FocusOut,
    Pause,
    Save {
        path: PathBuf,
    },
    Load {
        path: PathBuf,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
    },
}

impl ScriptEvent {
    fn into_event(self) -> Event {
        match self {
            ScriptEvent::Tool { name } => Event::ToolSelect(name),
            ScriptEvent::Down { x, y, button } => Event::PointerDown {
                button: button.into(),
                pos: (x, y).into(),
            },
            ScriptEvent::Up { x, y, button } => Event::PointerUp {
                button: button.into(),
                pos: (x, y).into(),
            },
            ScriptEvent::Move { x, y, primary } => Event::PointerMove {
                pos: (x, y).into(),
                buttons: if primary {
                    ButtonMask::PRIMARY
                } else {
                    ButtonMask::NONE
                },
            },
            ScriptEvent::Enter => Event::PointerEnter,
            ScriptEvent::Leave => Event::PointerLeave,
            ScriptEvent::FocusIn => Event::FocusIn,
            ScriptEvent::FocusOut => Event::FocusOut,
            ScriptEvent::Pause => Event::PauseToggle,
            ScriptEvent::Save { path } => Event::SaveRequest(path),
            ScriptEvent::Load { path } => Event::LoadRequest(path),
            ScriptEvent::Key {
                key,
                ctrl,
                shift,
                alt,
            } => Event::Key {
                key,
                ctrl,
                shift,
                alt,
            },
        }
    }
}

/// Events delivered before a given frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    pub frame: u64,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// A parsed, validated event script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_frames")]
    pub frames: u64,
    #[serde(default)]
    pub at: Vec<ScriptStep>,
}

fn default_frames() -> u64 {
    DEFAULT_FRAMES
}

impl Script {
    /// Reads and validates a script file.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses and validates script text.
    ///
    /// Unknown tool names, non-finite coordinates and empty key names are rejected.
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let script: Script = toml::from_str(text)?;
        for step in &script.at {
            for event in &step.events {
                validate(step.frame, event)?;
            }
        }
        Ok(script)
    }

    /// Dispatcher events grouped by frame, in script order within each frame.
    pub fn schedule(&self) -> BTreeMap<u64, Vec<Event>> {
        let mut schedule: BTreeMap<u64, Vec<Event>> = BTreeMap::new();
        for step in &self.at {
            schedule
                .entry(step.frame)
                .or_default()
                .extend(step.events.iter().cloned().map(ScriptEvent::into_event));
        }
        schedule
    }
}

fn validate(frame: u64, event: &ScriptEvent) -> Result<(), ScriptError> {
    let invalid = |reason: String| ScriptError::InvalidEvent { frame, reason };
    match event {
        ScriptEvent::Tool { name } => {
            name.parse::<ToolKind>().map_err(invalid)?;
        }
        ScriptEvent::Down { x, y, .. }
        | ScriptEvent::Up { x, y, .. }
        | ScriptEvent::Move { x, y, .. } => {
            if !x.is_finite() || !y.is_finite() {
                return Err(invalid(format!("non-finite position ({x}, {y})")));
            }
        }
        ScriptEvent::Key { key, .. } if key.trim().is_empty() => {
            return Err(invalid("empty key name".to_string()));
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Point;

    #[test]
    fn parses_documented_example() {
        let script = Script::parse(
            r#"
            frames = 10

            [[at]]
            frame = 0
            events = [
              { event = "tool", name = "circle" },
              { event = "down", x = 100, y = 100 },
              { event = "move", x = 140.5, y = 100, primary = true },
              { event = "up", x = 140, y = 100 },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(script.frames, 10);
        let schedule = script.schedule();
        let events = &schedule[&0];
        assert_eq!(events[0], Event::ToolSelect("circle".to_string()));
        assert_eq!(events[1], Event::down((100.0, 100.0)));
        assert_eq!(
            events[2],
            Event::PointerMove {
                pos: Point::new(140.5, 100.0),
                buttons: ButtonMask::PRIMARY
            }
        );
        assert_eq!(events[3], Event::up((140.0, 100.0)));
    }

    #[test]
    fn steps_on_the_same_frame_are_merged_in_order() {
        let script = Script::parse(
            r#"
            [[at]]
            frame = 3
            events = [{ event = "pause" }]

            [[at]]
            frame = 3
            events = [{ event = "key", key = "G", ctrl = true }, { event = "focus_out" }]
            "#,
        )
        .unwrap();

        assert_eq!(script.frames, DEFAULT_FRAMES);
        assert_eq!(
            script.schedule()[&3],
            vec![Event::PauseToggle, Event::ctrl_key("G"), Event::FocusOut]
        );
    }

    #[test]
    fn buttons_and_world_files_map_through() {
        let script = Script::parse(
            r#"
            [[at]]
            frame = 1
            events = [
              { event = "down", x = 1, y = 2, button = "right" },
              { event = "save", path = "scene.json.gz" },
              { event = "load", path = "scene.json.gz" },
            ]
            "#,
        )
        .unwrap();

        let events = &script.schedule()[&1];
        assert_eq!(
            events[0],
            Event::PointerDown {
                button: MouseButton::Right,
                pos: Point::new(1.0, 2.0)
            }
        );
        assert_eq!(events[1], Event::SaveRequest(PathBuf::from("scene.json.gz")));
        assert_eq!(events[2], Event::LoadRequest(PathBuf::from("scene.json.gz")));
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = Script::parse(
            r#"
            [[at]]
            frame = 2
            events = [{ event = "tool", name = "spring" }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::InvalidEvent { frame: 2, .. }));
    }

    #[test]
    fn unknown_event_kind_is_a_parse_error() {
        let err = Script::parse(
            r#"
            [[at]]
            frame = 0
            events = [{ event = "explode" }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Script::load(Path::new("/nonexistent/physbox-script.toml")).unwrap_err();
        assert!(matches!(err, ScriptError::Read { .. }));
    }
}
