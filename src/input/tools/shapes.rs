//! Two-point drag tools: circle, box and triangle.
//!
//! Each one anchors on primary-down and commits on primary-up. A zero-length
//! drag replays the previous shape at the click point; with no previous shape
//! it commits nothing.

use super::{EventResult, OVERLAY_WIDTH, ToolContext, ToolKind, ToolSettings, report_commit};
use crate::draw::Surface;
use crate::input::events::{Event, MouseButton};
use crate::util::{self, Point};
use log::debug;

/// Smallest circle radius (pixels).
pub const MIN_RADIUS: f64 = 5.0;
/// Smallest box side (pixels).
pub const MIN_BOX_SIDE: f64 = 10.0;
/// Smallest triangle baseline (pixels).
pub const MIN_BASELINE: f64 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct CircleTool {
    anchor: Option<Point>,
    last_radius: Option<f64>,
}

impl CircleTool {
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
                self.anchor = Some(pos);
                EventResult::Handled
            }
            Event::PointerUp {
                button: MouseButton::Left,
                pos,
            } => {
                let Some(anchor) = self.anchor.take() else {
                    return EventResult::Ignored;
                };
                let dragged = util::distance(anchor, pos);
                let radius = if dragged > 0.0 {
                    dragged.max(MIN_RADIUS)
                } else if let Some(last) = self.last_radius {
                    last
                } else {
                    debug!("circle: zero-length drag with no previous radius");
                    return EventResult::Handled;
                };
                self.last_radius = Some(radius);
                report_commit(
                    ToolKind::Circle,
                    ctx.world.add_circle(anchor, radius, ctx.settings.material),
                );
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let dragged = util::distance(anchor, pointer);
        if dragged > 0.0 {
            let color = settings.overlay_color;
            surface.draw_circle(color, anchor, dragged.max(MIN_RADIUS), OVERLAY_WIDTH);
            surface.draw_line(color, anchor, pointer, 1.0);
        }
    }

    pub(super) fn cancel(&mut self) {
        self.anchor = None;
    }

    pub(super) fn is_busy(&self) -> bool {
        self.anchor.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoxTool {
    anchor: Option<Point>,
    /// Drag vector of the last box, replayed by zero-length drags.
    last_delta: Option<Point>,
}

impl BoxTool {
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
                self.anchor = Some(pos);
                EventResult::Handled
            }
            Event::PointerUp {
                button: MouseButton::Left,
                pos,
            } => {
                let Some(anchor) = self.anchor.take() else {
                    return EventResult::Ignored;
                };
                let rect = if pos != anchor {
                    self.last_delta = Some(pos.delta_from(anchor));
                    util::normalized_rect(anchor, pos)
                } else if let Some(delta) = self.last_delta {
                    util::normalized_rect(pos.offset(-delta.x, -delta.y), pos)
                } else {
                    debug!("box: zero-length drag with no previous box");
                    return EventResult::Handled;
                };
                report_commit(
                    ToolKind::Box,
                    ctx.world.add_rect(
                        rect.center(),
                        rect.width.max(MIN_BOX_SIDE) / 2.0,
                        rect.height.max(MIN_BOX_SIDE) / 2.0,
                        ctx.settings.material,
                    ),
                );
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        if let Some(anchor) = self.anchor.filter(|anchor| *anchor != pointer) {
            let rect = util::normalized_rect(anchor, pointer);
            surface.draw_polygon(settings.overlay_color, &rect.corners(), OVERLAY_WIDTH);
        }
    }

    pub(super) fn cancel(&mut self) {
        self.anchor = None;
    }

    pub(super) fn is_busy(&self) -> bool {
        self.anchor.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriangleTool {
    anchor: Option<Point>,
    /// Baseline vector of the last triangle, replayed by zero-length drags.
    last_delta: Option<Point>,
}

impl TriangleTool {
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
                self.anchor = Some(pos);
                EventResult::Handled
            }
            Event::PointerUp {
                button: MouseButton::Left,
                pos,
            } => {
                let Some(anchor) = self.anchor.take() else {
                    return EventResult::Ignored;
                };
                let (start, end) = if pos != anchor {
                    self.last_delta = Some(pos.delta_from(anchor));
                    (anchor, pos)
                } else if let Some(delta) = self.last_delta {
                    (pos.offset(-delta.x, -delta.y), pos)
                } else {
                    debug!("triangle: zero-length drag with no previous baseline");
                    return EventResult::Handled;
                };
                let (start, end) = util::extend_to_min_length(start, end, MIN_BASELINE);
                let vertices = util::triangle_from_line(start, end);
                report_commit(
                    ToolKind::Triangle,
                    ctx.world
                        .add_convex_polygon(&vertices, ctx.settings.material),
                );
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        if let Some(anchor) = self.anchor.filter(|anchor| *anchor != pointer) {
            let color = settings.overlay_color;
            let vertices = util::triangle_from_line(anchor, pointer);
            surface.draw_polygon(color, &vertices, OVERLAY_WIDTH);
            surface.draw_line(color, anchor, pointer, 1.0);
        }
    }

    pub(super) fn cancel(&mut self) {
        self.anchor = None;
    }

    pub(super) fn is_busy(&self) -> bool {
        self.anchor.is_some()
    }
}
