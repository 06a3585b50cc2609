//! Tools that act on bodies already in the world.

use super::{EventResult, OVERLAY_WIDTH, ToolContext, ToolKind, ToolSettings};
use crate::draw::Surface;
use crate::input::events::{Event, MouseButton};
use crate::util::Point;
use crate::world::{BodyHandle, JointHandle, World, WorldError};
use log::{debug, warn};

/// Topmost dynamic body under `pos`.
fn pick(world: &dyn World, pos: Point) -> Option<BodyHandle> {
    world.bodies_at_point(pos, false).into_iter().next()
}

/// Pixel point to world meters.
fn to_meters(world: &dyn World, pos: Point) -> Point {
    world.to_world(pos).scaled(1.0 / world.pixels_per_meter())
}

fn report_joint(kind: ToolKind, result: Result<JointHandle, WorldError>) {
    match result {
        Ok(joint) => debug!("{kind}: committed {joint}"),
        Err(err) => warn!("{kind}: world rejected joint: {err}"),
    }
}

/// Drags bodies around.
///
/// While the simulation runs the body follows a pointer joint, so it keeps
/// colliding. While paused the body is teleported directly, keeping the
/// offset between the click point and its origin.
#[derive(Debug, Clone, Default)]
pub struct GrabTool {
    /// Body held while paused, with its origin offset from the grab point (meters).
    held: Option<(BodyHandle, Point)>,
    pointer_joint: bool,
}

impl GrabTool {
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        match *event {
            Event::PointerDown {
                button: MouseButton::Left,
                pos,
            } => {
                let Some(body) = pick(&*ctx.world, pos) else {
                    return EventResult::Ignored;
                };
                if ctx.state.run_physics {
                    ctx.world.attach_pointer_joint(body, pos);
                    self.pointer_joint = true;
                } else if let Some(origin) = ctx.world.body_position(body) {
                    let grab_point = to_meters(&*ctx.world, pos);
                    self.held = Some((body, origin.delta_from(grab_point)));
                }
                debug!("grab: holding {body}");
                EventResult::Handled
            }
            Event::PointerMove { pos, buttons } if buttons.primary => {
                // Resumed mid-drag: a running body must follow a joint.
                if ctx.state.run_physics {
                    if let Some((body, _)) = self.held.take() {
                        if ctx.world.contains_body(body) {
                            ctx.world.attach_pointer_joint(body, pos);
                            self.pointer_joint = true;
                            debug!("grab: {body} switched to pointer joint");
                        }
                    }
                }
                if self.pointer_joint {
                    ctx.world.move_pointer_joint(pos);
                } else if let Some((body, offset)) = self.held {
                    if !ctx.world.contains_body(body) {
                        self.held = None;
                        return EventResult::Ignored;
                    }
                    let target = to_meters(&*ctx.world, pos);
                    ctx.world
                        .set_body_position(body, target.offset(offset.x, offset.y));
                } else {
                    return EventResult::Ignored;
                }
                EventResult::Handled
            }
            Event::PointerUp {
                button: MouseButton::Left,
                ..
            } => {
                if self.pointer_joint {
                    ctx.world.remove_pointer_joint();
                    self.pointer_joint = false;
                }
                self.held = None;
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub(super) fn cancel(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.world.remove_pointer_joint();
        self.pointer_joint = false;
        self.held = None;
    }

    pub(super) fn is_busy(&self) -> bool {
        self.pointer_joint || self.held.is_some()
    }
}

/// Connects two bodies with a distance joint: press on one, release on the other.
#[derive(Debug, Clone, Default)]
pub struct JointTool {
    first: Option<(BodyHandle, Point)>,
}

impl JointTool {
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        match *event {
            Event::PointerDown {
                button: MouseButton::Left,
                pos,
            } => {
                self.first = pick(&*ctx.world, pos).map(|body| (body, pos));
                EventResult::Handled
            }
            Event::PointerUp {
                button: MouseButton::Left,
                pos,
            } => {
                let first = self.first.take();
                let second = pick(&*ctx.world, pos);
                match (first, second) {
                    (Some((a, anchor_a)), Some(b)) if a != b => {
                        report_joint(
                            ToolKind::Joint,
                            ctx.world.add_distance_joint(a, b, anchor_a, pos),
                        );
                    }
                    _ => debug!("joint: needs two distinct bodies"),
                }
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        if let Some((_, anchor)) = self.first {
            surface.draw_line(settings.overlay_color, anchor, pointer, OVERLAY_WIDTH);
        }
    }

    pub(super) fn cancel(&mut self) {
        self.first = None;
    }

    pub(super) fn is_busy(&self) -> bool {
        self.first.is_some()
    }
}

/// Pins a body to the world where it is clicked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinTool;

impl PinTool {
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        let Event::PointerDown {
            button: MouseButton::Left,
            pos,
        } = *event
        else {
            return EventResult::Ignored;
        };
        let Some(body) = pick(&*ctx.world, pos) else {
            return EventResult::Ignored;
        };
        report_joint(ToolKind::Pin, ctx.world.add_pin_joint(body, pos));
        EventResult::Handled
    }
}

/// Pins a body to the world where it is clicked and spins it with a motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotorTool;

impl MotorTool {
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        let Event::PointerDown {
            button: MouseButton::Left,
            pos,
        } = *event
        else {
            return EventResult::Ignored;
        };
        let Some(body) = pick(&*ctx.world, pos) else {
            return EventResult::Ignored;
        };
        report_joint(ToolKind::Motor, ctx.world.add_motor_joint(body, pos));
        EventResult::Handled
    }
}

/// Marks a body with a roll-motor annotation; the dispatcher applies its torque.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollTool;

impl RollTool {
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        let Event::PointerDown {
            button: MouseButton::Left,
            pos,
        } = *event
        else {
            return EventResult::Ignored;
        };
        let Some(body) = pick(&*ctx.world, pos) else {
            return EventResult::Ignored;
        };
        ctx.motors.attach(body, ctx.settings.roll_motor);
        debug!("roll: {body} now rolls");
        EventResult::Handled
    }
}
