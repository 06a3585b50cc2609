//! Pointer-driven tools.
//!
//! Exactly one [`Tool`] is active at a time. Every event goes through
//! [`Tool::handle_events`], which handles the global events (pause, focus,
//! tool switching, hotkeys, save/load) itself and hands everything else to
//! the variant's own state machine.
//!
//! Tools never own world objects: they hold at most transient handles for the
//! duration of one gesture, and [`Tool::cancel`] drops all of it.

mod destroy;
mod manipulate;
mod polygon;
mod shapes;


pub use destroy::DestroyTool;
pub use manipulate::{GrabTool, JointTool, MotorTool, PinTool, RollTool};
pub use polygon::{MagicPenTool, PolygonTool};
pub use shapes::{BoxTool, CircleTool, TriangleTool};

use super::events::Event;
use crate::config::keybindings::{self, Action, ActionMap};
use crate::draw::{self, Color, Surface};
use crate::game::{GameState, RollMotor, RollMotors};
use crate::util::Point;
use crate::world::{BodyHandle, BodyOptions, World, WorldError};
use log::{debug, error, info, warn};
use std::fmt;
use std::str::FromStr;

/// Distance (pixels) within which a click closes a polygon onto its first vertex.
pub const CLOSE_RADIUS: f64 = 15.0;
/// Displacement (pixels) from the first vertex after which closing is intentional.
pub const SAFE_DISTANCE: f64 = 55.0;
/// Stroke width of every tool overlay.
pub const OVERLAY_WIDTH: f64 = 3.0;

/// Identifies a tool variant. Names are unique and used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    MagicPen,
    Circle,
    Triangle,
    Box,
    Polygon,
    Grab,
    Motor,
    Pin,
    Joint,
    Roll,
    Destroy,
}

impl ToolKind {
    /// Every tool, in toolbar order.
    pub const ALL: [ToolKind; 11] = [
        ToolKind::MagicPen,
        ToolKind::Circle,
        ToolKind::Triangle,
        ToolKind::Box,
        ToolKind::Polygon,
        ToolKind::Grab,
        ToolKind::Motor,
        ToolKind::Pin,
        ToolKind::Joint,
        ToolKind::Roll,
        ToolKind::Destroy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::MagicPen => "magicpen",
            ToolKind::Circle => "circle",
            ToolKind::Triangle => "triangle",
            ToolKind::Box => "box",
            ToolKind::Polygon => "polygon",
            ToolKind::Grab => "grab",
            ToolKind::Motor => "motor",
            ToolKind::Pin => "pin",
            ToolKind::Joint => "joint",
            ToolKind::Roll => "roll",
            ToolKind::Destroy => "destroy",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown tool '{wanted}'"))
    }
}

/// Outcome of handing an event to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// The tool did nothing with the event.
    Ignored,
    /// The event was consumed.
    Handled,
    /// The dispatcher must switch to another tool.
    SwitchTool(ToolKind),
}

/// Settings shared by all tools, built once from the configuration.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Material of every body a shape tool commits.
    pub material: BodyOptions,
    /// Annotation attached by the Roll tool.
    pub roll_motor: RollMotor,
    pub overlay_color: Color,
    pub erase_color: Color,
    pub bindings: ActionMap,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            material: BodyOptions::default(),
            roll_motor: RollMotor::default(),
            overlay_color: draw::SKY,
            erase_color: draw::RED,
            bindings: ActionMap::new(),
        }
    }
}

/// Everything a tool may touch while handling one event.
pub struct ToolContext<'a> {
    pub world: &'a mut dyn World,
    pub state: &'a mut GameState,
    pub motors: &'a mut RollMotors,
    pub settings: &'a ToolSettings,
}

/// The closed set of tools.
#[derive(Debug, Clone)]
pub enum Tool {
    MagicPen(MagicPenTool),
    Circle(CircleTool),
    Triangle(TriangleTool),
    Box(BoxTool),
    Polygon(PolygonTool),
    Grab(GrabTool),
    Motor(MotorTool),
    Pin(PinTool),
    Joint(JointTool),
    Roll(RollTool),
    Destroy(DestroyTool),
}

impl Tool {
    /// Creates an idle tool of the given kind.
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::MagicPen => Tool::MagicPen(MagicPenTool::default()),
            ToolKind::Circle => Tool::Circle(CircleTool::default()),
            ToolKind::Triangle => Tool::Triangle(TriangleTool::default()),
            ToolKind::Box => Tool::Box(BoxTool::default()),
            ToolKind::Polygon => Tool::Polygon(PolygonTool::default()),
            ToolKind::Grab => Tool::Grab(GrabTool::default()),
            ToolKind::Motor => Tool::Motor(MotorTool),
            ToolKind::Pin => Tool::Pin(PinTool),
            ToolKind::Joint => Tool::Joint(JointTool::default()),
            ToolKind::Roll => Tool::Roll(RollTool),
            ToolKind::Destroy => Tool::Destroy(DestroyTool::default()),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::MagicPen(_) => ToolKind::MagicPen,
            Tool::Circle(_) => ToolKind::Circle,
            Tool::Triangle(_) => ToolKind::Triangle,
            Tool::Box(_) => ToolKind::Box,
            Tool::Polygon(_) => ToolKind::Polygon,
            Tool::Grab(_) => ToolKind::Grab,
            Tool::Motor(_) => ToolKind::Motor,
            Tool::Pin(_) => ToolKind::Pin,
            Tool::Joint(_) => ToolKind::Joint,
            Tool::Roll(_) => ToolKind::Roll,
            Tool::Destroy(_) => ToolKind::Destroy,
        }
    }

    /// Entry point for every event.
    ///
    /// # Behavior
    /// - Pause toggle, focus changes, cursor enter/leave and bound hotkeys
    ///   update [`GameState`] and are never seen by the tool itself
    /// - Tool selection returns [`EventResult::SwitchTool`]
    /// - Save/load requests are forwarded to the world
    /// - A primary-button press additionally asks the host for input focus
    /// - Everything else goes to the variant's state machine
    pub fn handle_events(&mut self, event: &Event, ctx: &mut ToolContext<'_>) -> EventResult {
        match event {
            Event::PauseToggle => {
                toggle_pause(ctx.state);
                EventResult::Handled
            }
            Event::FocusIn => {
                ctx.state.in_focus = true;
                EventResult::Handled
            }
            Event::FocusOut => {
                ctx.state.in_focus = false;
                EventResult::Handled
            }
            Event::PointerEnter => {
                ctx.state.cursor_visible = true;
                EventResult::Handled
            }
            Event::PointerLeave => {
                ctx.state.cursor_visible = false;
                EventResult::Handled
            }
            Event::ToolSelect(name) => match name.parse::<ToolKind>() {
                Ok(kind) => EventResult::SwitchTool(kind),
                Err(err) => {
                    warn!("Ignoring tool selection: {err}");
                    EventResult::Handled
                }
            },
            Event::SaveRequest(path) => {
                ctx.world.remove_pointer_joint();
                if let Err(err) = ctx.world.save(path) {
                    error!("Failed to save world to {}: {err}", path.display());
                }
                EventResult::Handled
            }
            Event::LoadRequest(path) => {
                // No gesture may keep handles into the replaced world.
                self.cancel(ctx);
                ctx.motors.clear();
                if let Err(err) = ctx.world.load(path) {
                    error!("Failed to load world from {}: {err}", path.display());
                }
                EventResult::Handled
            }
            Event::Key {
                key,
                ctrl,
                shift,
                alt,
            } => match keybindings::lookup_action(&ctx.settings.bindings, key, *ctrl, *shift, *alt)
            {
                Some(Action::TogglePause) => {
                    toggle_pause(ctx.state);
                    EventResult::Handled
                }
                Some(action) => match action.tool() {
                    Some(kind) => EventResult::SwitchTool(kind),
                    None => EventResult::Handled,
                },
                None => self.handle_tool_event(event, ctx),
            },
            _ => {
                if event.is_primary_down() {
                    ctx.state.request_focus();
                }
                self.handle_tool_event(event, ctx)
            }
        }
    }

    /// Variant-specific event handling.
    fn handle_tool_event(&mut self, event: &Event, ctx: &mut ToolContext<'_>) -> EventResult {
        match self {
            Tool::MagicPen(tool) => tool.handle_tool_event(event, ctx),
            Tool::Circle(tool) => tool.handle_tool_event(event, ctx),
            Tool::Triangle(tool) => tool.handle_tool_event(event, ctx),
            Tool::Box(tool) => tool.handle_tool_event(event, ctx),
            Tool::Polygon(tool) => tool.handle_tool_event(event, ctx),
            Tool::Grab(tool) => tool.handle_tool_event(event, ctx),
            Tool::Motor(tool) => tool.handle_tool_event(event, ctx),
            Tool::Pin(tool) => tool.handle_tool_event(event, ctx),
            Tool::Joint(tool) => tool.handle_tool_event(event, ctx),
            Tool::Roll(tool) => tool.handle_tool_event(event, ctx),
            Tool::Destroy(tool) => tool.handle_tool_event(event, ctx),
        }
    }

    /// Draws the in-progress gesture, `pointer` being the current pointer position.
    pub fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        match self {
            Tool::MagicPen(tool) => tool.draw(surface, pointer, settings),
            Tool::Circle(tool) => tool.draw(surface, pointer, settings),
            Tool::Triangle(tool) => tool.draw(surface, pointer, settings),
            Tool::Box(tool) => tool.draw(surface, pointer, settings),
            Tool::Polygon(tool) => tool.draw(surface, pointer, settings),
            Tool::Joint(tool) => tool.draw(surface, pointer, settings),
            Tool::Destroy(tool) => tool.draw(surface, settings),
            Tool::Grab(_) | Tool::Motor(_) | Tool::Pin(_) | Tool::Roll(_) => {}
        }
    }

    /// Resets all gesture state. Called whenever the active tool changes.
    pub fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        match self {
            Tool::MagicPen(tool) => tool.cancel(),
            Tool::Circle(tool) => tool.cancel(),
            Tool::Triangle(tool) => tool.cancel(),
            Tool::Box(tool) => tool.cancel(),
            Tool::Polygon(tool) => tool.cancel(),
            Tool::Grab(tool) => tool.cancel(ctx),
            Tool::Joint(tool) => tool.cancel(),
            Tool::Destroy(tool) => tool.cancel(),
            Tool::Motor(_) | Tool::Pin(_) | Tool::Roll(_) => {}
        }
    }

    /// True while a gesture is buffered.
    pub fn is_busy(&self) -> bool {
        match self {
            Tool::MagicPen(tool) => tool.is_busy(),
            Tool::Circle(tool) => tool.is_busy(),
            Tool::Triangle(tool) => tool.is_busy(),
            Tool::Box(tool) => tool.is_busy(),
            Tool::Polygon(tool) => tool.is_busy(),
            Tool::Grab(tool) => tool.is_busy(),
            Tool::Joint(tool) => tool.is_busy(),
            Tool::Destroy(tool) => tool.is_busy(),
            Tool::Motor(_) | Tool::Pin(_) | Tool::Roll(_) => false,
        }
    }
}

fn toggle_pause(state: &mut GameState) {
    state.run_physics = !state.run_physics;
    info!(
        "Simulation {}",
        if state.run_physics { "resumed" } else { "paused" }
    );
}

/// Logs the outcome of a body commit; world failures never escape a tool.
fn report_commit(kind: ToolKind, result: Result<BodyHandle, WorldError>) -> Option<BodyHandle> {
    match result {
        Ok(body) => {
            debug!("{kind}: committed {body}");
            Some(body)
        }
        Err(err) => {
            warn!("{kind}: world rejected shape: {err}");
            None
        }
    }
}
