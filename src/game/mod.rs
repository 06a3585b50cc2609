//! Mode dispatcher and frame loop.
//!
//! [`Game`] owns the session state, the tool registry and the roll-motor
//! annotations. It routes every event to the active tool and, once per frame,
//! applies roll torques, steps the world and composes the picture:
//! world, then the active tool's overlay, then the software cursor.

mod clock;
mod roll;


pub use clock::FrameClock;
pub use roll::{RollMotor, RollMotors};

use crate::config::Config;
use crate::draw::{self, Color, Surface};
use crate::input::events::Event;
use crate::input::tools::{EventResult, Tool, ToolContext, ToolKind, ToolSettings};
use crate::util::Point;
use crate::world::{BodyOptions, World};
use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Process-wide session state, passed by reference to the tools.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Simulation stepping enabled.
    pub run_physics: bool,
    /// Window/input focus; gates stepping and drawing.
    pub in_focus: bool,
    pub current_tool: ToolKind,
    /// Last known pointer position (pixels).
    pub pointer: Point,
    /// Pointer is over the canvas.
    pub cursor_visible: bool,
    focus_requested: bool,
}

impl GameState {
    pub fn new(current_tool: ToolKind, run_physics: bool) -> Self {
        Self {
            run_physics,
            in_focus: true,
            current_tool,
            pointer: Point::ORIGIN,
            cursor_visible: false,
            focus_requested: false,
        }
    }

    /// Asks the host to give the canvas input focus.
    pub fn request_focus(&mut self) {
        self.focus_requested = true;
    }

    /// Returns and clears a pending focus request.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }
}

/// One instance of every tool, created once and kept for the whole session.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Tool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        let tools = ToolKind::ALL
            .into_iter()
            .map(|kind| (kind, Tool::new(kind)))
            .collect();
        Self { tools }
    }

    pub fn get(&self, kind: ToolKind) -> Option<&Tool> {
        self.tools.get(&kind)
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> Option<&mut Tool> {
        self.tools.get_mut(&kind)
    }

    /// Looks a tool up by its registry name.
    pub fn by_name(&self, name: &str) -> Option<&Tool> {
        name.parse::<ToolKind>().ok().and_then(|kind| self.get(kind))
    }

    /// Registered tool names, in toolbar order.
    pub fn names(&self) -> Vec<&'static str> {
        ToolKind::ALL
            .into_iter()
            .filter(|kind| self.tools.contains_key(kind))
            .map(ToolKind::name)
            .collect()
    }
}

/// Dispatcher settings, derived from [`Config`].
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub tools: ToolSettings,
    pub default_tool: ToolKind,
    pub start_paused: bool,
    pub background: Color,
    pub show_cursor: bool,
    pub frame_rate: f64,
    pub throttle: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tools: ToolSettings::default(),
            default_tool: ToolKind::MagicPen,
            start_paused: false,
            background: draw::WHITE,
            show_cursor: true,
            frame_rate: 30.0,
            throttle: true,
        }
    }
}

impl GameSettings {
    /// Builds settings from a validated configuration.
    ///
    /// # Errors
    /// Returns an error if a keybinding cannot be parsed or is bound twice.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bindings = config
            .keybindings
            .build_action_map()
            .map_err(|err| anyhow!("Invalid keybindings: {err}"))?;

        let default_tool = config.tools.default_tool.parse().unwrap_or_else(|err| {
            warn!("{err}, starting with the magic pen");
            ToolKind::MagicPen
        });

        Ok(Self {
            tools: ToolSettings {
                material: BodyOptions {
                    dynamic: true,
                    density: config.material.density,
                    restitution: config.material.restitution,
                    friction: config.material.friction,
                },
                roll_motor: RollMotor {
                    target_velocity: config.roll_motor.target_velocity,
                    strength: config.roll_motor.strength,
                },
                overlay_color: config.render.overlay_color.to_color(),
                erase_color: config.render.erase_color.to_color(),
                bindings,
            },
            default_tool,
            start_paused: config.simulation.start_paused,
            background: config.render.background.to_color(),
            show_cursor: config.render.show_cursor,
            frame_rate: config.simulation.frame_rate,
            throttle: config.simulation.throttle,
        })
    }
}

/// The mode dispatcher.
pub struct Game<W: World> {
    world: W,
    state: GameState,
    registry: ToolRegistry,
    motors: RollMotors,
    settings: GameSettings,
    clock: FrameClock,
    frames: u64,
}

impl<W: World> Game<W> {
    pub fn new(world: W, settings: GameSettings) -> Self {
        let state = GameState::new(settings.default_tool, !settings.start_paused);
        let clock = FrameClock::new(settings.frame_rate, settings.throttle);
        info!(
            "Game ready: tool {}, simulation {}",
            state.current_tool,
            if state.run_physics { "running" } else { "paused" }
        );
        Self {
            world,
            state,
            registry: ToolRegistry::new(),
            motors: RollMotors::new(),
            settings,
            clock,
            frames: 0,
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn motors(&self) -> &RollMotors {
        &self.motors
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn active_tool(&self) -> Option<&Tool> {
        self.registry.get(self.state.current_tool)
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Returns and clears a pending request for the canvas to take input focus.
    pub fn take_focus_request(&mut self) -> bool {
        self.state.take_focus_request()
    }

    /// Routes one event to the active tool.
    ///
    /// Pointer positions are snapped to whole pixels first. A tool-switch
    /// request from the tool is carried out before returning.
    pub fn dispatch(&mut self, event: Event) -> EventResult {
        let event = event.rounded();
        if let Some(pos) = event.position() {
            self.state.pointer = pos;
        }

        let Some(tool) = self.registry.get_mut(self.state.current_tool) else {
            warn!("No tool registered as {}", self.state.current_tool);
            return EventResult::Ignored;
        };
        let mut ctx = ToolContext {
            world: &mut self.world,
            state: &mut self.state,
            motors: &mut self.motors,
            settings: &self.settings.tools,
        };
        let result = tool.handle_events(&event, &mut ctx);

        if let EventResult::SwitchTool(kind) = result {
            self.set_tool(kind);
        }
        result
    }

    /// Makes `kind` the active tool, cancelling the current one first.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if let Some(tool) = self.registry.get_mut(self.state.current_tool) {
            let mut ctx = ToolContext {
                world: &mut self.world,
                state: &mut self.state,
                motors: &mut self.motors,
                settings: &self.settings.tools,
            };
            tool.cancel(&mut ctx);
        }
        if self.registry.get(kind).is_none() {
            warn!("No tool registered as {kind}");
            return;
        }
        if kind != self.state.current_tool {
            info!("Switched tool: {} -> {}", self.state.current_tool, kind);
        }
        self.state.current_tool = kind;
    }

    /// Advances one frame: roll torques and a physics step while running, then
    /// a full redraw. Nothing happens while unfocused.
    ///
    /// Returns whether the surface was redrawn.
    pub fn frame(&mut self, surface: &mut dyn Surface) -> bool {
        self.frames += 1;
        if !self.state.in_focus {
            return false;
        }

        if self.state.run_physics {
            self.motors.apply(&mut self.world);
            self.world.step();
        }

        surface.clear(self.settings.background);
        self.world.render(surface);
        if let Some(tool) = self.registry.get(self.state.current_tool) {
            tool.draw(surface, self.state.pointer, &self.settings.tools);
        }
        if self.settings.show_cursor && self.state.cursor_visible {
            draw::draw_cursor(surface, self.state.pointer);
        }
        true
    }

    /// Runs `frames` frames. Before each one, `events` is asked for the events
    /// scheduled on that frame index; the clock then holds the frame cadence.
    pub fn run<F>(&mut self, frames: u64, surface: &mut dyn Surface, mut events: F)
    where
        F: FnMut(u64) -> Vec<Event>,
    {
        for index in 0..frames {
            for event in events(index) {
                debug!("frame {index}: {event:?}");
                self.dispatch(event);
            }
            self.frame(surface);
            self.clock.tick();
        }
    }
}
