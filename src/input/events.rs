//! Input event types consumed by the dispatcher and the tools.
//!
//! Hosts (the headless script runner, or an interactive window) translate
//! their native events into [`Event`] values. Pointer positions are device
//! pixels with y pointing down.

use crate::util::Point;
use std::path::PathBuf;

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button (primary, drives every tool gesture)
    Left,
    /// Right mouse button (currently unused by tools)
    Right,
    /// Middle mouse button (currently unused by tools)
    Middle,
}

/// Set of buttons held during a pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask {
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
}

impl ButtonMask {
    pub const NONE: ButtonMask = ButtonMask {
        primary: false,
        secondary: false,
        middle: false,
    };

    pub const PRIMARY: ButtonMask = ButtonMask {
        primary: true,
        secondary: false,
        middle: false,
    };
}

/// One input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PointerDown { button: MouseButton, pos: Point },
    PointerUp { button: MouseButton, pos: Point },
    PointerMove { pos: Point, buttons: ButtonMask },
    /// Pointer entered the canvas; shows the software cursor.
    PointerEnter,
    /// Pointer left the canvas; hides the software cursor.
    PointerLeave,
    FocusIn,
    FocusOut,
    /// Select a tool by its registry name.
    ToolSelect(String),
    PauseToggle,
    SaveRequest(PathBuf),
    LoadRequest(PathBuf),
    /// Key press, `key` being the key name as written in keybindings ("C", "Space").
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
    },
}

impl Event {
    /// Primary-button press at `pos`.
    pub fn down(pos: impl Into<Point>) -> Self {
        Event::PointerDown {
            button: MouseButton::Left,
            pos: pos.into(),
        }
    }

    /// Primary-button release at `pos`.
    pub fn up(pos: impl Into<Point>) -> Self {
        Event::PointerUp {
            button: MouseButton::Left,
            pos: pos.into(),
        }
    }

    /// Motion to `pos`, with or without the primary button held.
    pub fn motion(pos: impl Into<Point>, primary: bool) -> Self {
        Event::PointerMove {
            pos: pos.into(),
            buttons: if primary {
                ButtonMask::PRIMARY
            } else {
                ButtonMask::NONE
            },
        }
    }

    pub fn key(key: &str) -> Self {
        Event::Key {
            key: key.to_string(),
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl_key(key: &str) -> Self {
        Event::Key {
            key: key.to_string(),
            ctrl: true,
            shift: false,
            alt: false,
        }
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Event::PointerDown { pos, .. }
            | Event::PointerUp { pos, .. }
            | Event::PointerMove { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Copy of the event with its pointer position snapped to whole pixels.
    pub fn rounded(self) -> Self {
        match self {
            Event::PointerDown { button, pos } => Event::PointerDown {
                button,
                pos: pos.rounded(),
            },
            Event::PointerUp { button, pos } => Event::PointerUp {
                button,
                pos: pos.rounded(),
            },
            Event::PointerMove { pos, buttons } => Event::PointerMove {
                pos: pos.rounded(),
                buttons,
            },
            other => other,
        }
    }

    pub fn is_primary_down(&self) -> bool {
        matches!(
            self,
            Event::PointerDown {
                button: MouseButton::Left,
                ..
            }
        )
    }

    pub fn is_primary_up(&self) -> bool {
        matches!(
            self,
            Event::PointerUp {
                button: MouseButton::Left,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_only_touches_pointer_events() {
        let ev = Event::motion((10.4, 19.6), true).rounded();
        assert_eq!(ev.position(), Some(Point::new(10.0, 20.0)));
        assert_eq!(Event::PauseToggle.rounded(), Event::PauseToggle);
    }

    #[test]
    fn primary_helpers_ignore_other_buttons() {
        assert!(Event::down((1.0, 1.0)).is_primary_down());
        let right = Event::PointerDown {
            button: MouseButton::Right,
            pos: Point::ORIGIN,
        };
        assert!(!right.is_primary_down());
        assert!(Event::up((1.0, 1.0)).is_primary_up());
    }
}
