//! Freeform polygon tools.
//!
//! [`PolygonTool`] collects one vertex per click, [`MagicPenTool`] one per
//! motion event while the button is held. Both only close a polygon once the
//! gesture has been "safe": it has moved at least [`SAFE_DISTANCE`] away from
//! its first vertex. A failed close always leaves an empty buffer.

use super::{
    CLOSE_RADIUS, EventResult, OVERLAY_WIDTH, SAFE_DISTANCE, ToolContext, ToolKind, ToolSettings,
    report_commit,
};
use crate::draw::Surface;
use crate::input::events::{Event, MouseButton};
use crate::util::{self, Point};
use log::debug;

/// Smallest number of recorded points before a pen sketch may close.
const MIN_PEN_POINTS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct PolygonTool {
    vertices: Vec<Point>,
    /// Last committed outline, closing vertex included.
    previous: Option<Vec<Point>>,
    safe: bool,
}

impl PolygonTool {
    /// Handles clicks.
    ///
    /// # Behavior
    /// - Press with no gesture open: starts one at the press point
    /// - Release on the lone first vertex: replays the previous polygon so that
    ///   its last vertex lands on the click, or keeps the gesture open
    /// - Press/release at the position of the last vertex: ignored
    /// - Press/release within [`CLOSE_RADIUS`] of the first vertex: closes and
    ///   commits when safe, aborts otherwise
    /// - Any other press/release: appends a vertex
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        let (pos, is_down) = match *event {
            Event::PointerDown {
                button: MouseButton::Left,
                pos,
            } => (pos, true),
            Event::PointerUp {
                button: MouseButton::Left,
                pos,
            } => (pos, false),
            _ => return EventResult::Ignored,
        };

        let Some(&first) = self.vertices.first() else {
            if is_down {
                self.vertices.push(pos);
                self.safe = false;
                return EventResult::Handled;
            }
            return EventResult::Ignored;
        };

        if !is_down && self.vertices.len() == 1 && pos == first {
            if let Some(previous) = &self.previous {
                let replay = util::translate_to(previous, pos);
                report_commit(
                    ToolKind::Polygon,
                    ctx.world.add_complex_polygon(&replay, ctx.settings.material),
                );
                self.vertices.clear();
            }
            return EventResult::Handled;
        }

        if self.vertices.last() == Some(&pos) {
            return EventResult::Handled;
        }

        let from_start = util::distance(pos, first);
        if from_start < CLOSE_RADIUS {
            if self.safe {
                self.vertices.push(first);
                let committed = report_commit(
                    ToolKind::Polygon,
                    ctx.world
                        .add_complex_polygon(&self.vertices, ctx.settings.material),
                );
                if committed.is_some() {
                    self.previous = Some(self.vertices.clone());
                }
            } else {
                debug!("polygon: closed before it was safe, discarding");
            }
            self.vertices.clear();
        } else {
            self.vertices.push(pos);
            if from_start >= SAFE_DISTANCE {
                self.safe = true;
            }
        }
        EventResult::Handled
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        draw_outline(surface, &self.vertices, pointer, settings);
    }

    pub(super) fn cancel(&mut self) {
        self.vertices.clear();
    }

    pub(super) fn is_busy(&self) -> bool {
        !self.vertices.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MagicPenTool {
    vertices: Vec<Point>,
    /// Last committed sketch.
    previous: Option<Vec<Point>>,
    safe: bool,
}

impl MagicPenTool {
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
                self.vertices = vec![pos];
                self.safe = false;
                EventResult::Handled
            }
            Event::PointerMove { pos, .. } => {
                let Some(&first) = self.vertices.first() else {
                    return EventResult::Ignored;
                };
                self.vertices.push(pos);
                if util::distance(pos, first) >= SAFE_DISTANCE
                    && self.vertices.len() >= MIN_PEN_POINTS
                {
                    self.safe = true;
                }
                EventResult::Handled
            }
            Event::PointerUp {
                button: MouseButton::Left,
                pos,
            } => {
                if self.vertices.is_empty() {
                    return EventResult::Ignored;
                }
                let sketch = std::mem::take(&mut self.vertices);
                let sketch = match (&self.previous, sketch.len()) {
                    (Some(previous), 1) => util::translate_to(previous, pos),
                    _ if self.safe => sketch,
                    _ => {
                        debug!("magicpen: sketch never became safe, discarding");
                        return EventResult::Handled;
                    }
                };
                let committed = report_commit(
                    ToolKind::MagicPen,
                    ctx.world.add_complex_polygon(&sketch, ctx.settings.material),
                );
                if committed.is_some() {
                    self.previous = Some(sketch);
                }
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, pointer: Point, settings: &ToolSettings) {
        if self.vertices.len() > 1 {
            draw_outline(surface, &self.vertices, pointer, settings);
        }
    }

    pub(super) fn cancel(&mut self) {
        self.vertices.clear();
    }

    pub(super) fn is_busy(&self) -> bool {
        !self.vertices.is_empty()
    }
}

/// Open outline, guide segment to the pointer and closing target.
fn draw_outline(surface: &mut dyn Surface, vertices: &[Point], pointer: Point, settings: &ToolSettings) {
    let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) else {
        return;
    };
    let color = settings.overlay_color;
    surface.draw_polyline(color, vertices, OVERLAY_WIDTH);
    surface.draw_line(color, last, pointer, OVERLAY_WIDTH);
    surface.draw_circle(color, first, CLOSE_RADIUS, OVERLAY_WIDTH);
}
