//! Input handling and tool state machines.
//!
//! This module defines the host-agnostic events the dispatcher consumes and
//! the tools that turn pointer gestures into bodies, joints and edits of the
//! physics world.

pub mod events;
pub mod tools;

// Re-export commonly used types at module level
pub use events::{ButtonMask, Event, MouseButton};
pub use tools::{EventResult, Tool, ToolContext, ToolKind, ToolSettings};
