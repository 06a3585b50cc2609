use super::{EventResult, OVERLAY_WIDTH, ToolContext, ToolSettings};
use crate::draw::Surface;
use crate::input::events::{Event, MouseButton};
use crate::util::Point;
use log::debug;
use std::collections::VecDeque;

/// Number of pointer positions kept in the erase trail.
pub const TRAIL_LENGTH: usize = 10;

/// Erases whatever the pointer sweeps over while the button is held.
///
/// A hit body loses one joint per event while it has any, then the body itself.
#[derive(Debug, Clone, Default)]
pub struct DestroyTool {
    trail: VecDeque<Point>,
}

impl DestroyTool {
    pub(super) fn handle_tool_event(
        &mut self,
        event: &Event,
        ctx: &mut ToolContext<'_>,
    ) -> EventResult {
        let pos = match *event {
            Event::PointerDown {
                button: MouseButton::Left,
                pos,
            } => pos,
            Event::PointerMove { pos, buttons } if buttons.primary => pos,
            Event::PointerUp {
                button: MouseButton::Left,
                ..
            } => {
                self.cancel();
                return EventResult::Handled;
            }
            _ => return EventResult::Ignored,
        };

        self.trail.push_back(pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }

        if let Some(body) = ctx.world.bodies_at_point(pos, false).into_iter().next() {
            match ctx.world.joints_of(body).first() {
                Some(&joint) => {
                    debug!("destroy: removing {joint} of {body}");
                    ctx.world.destroy_joint(joint);
                }
                None => {
                    debug!("destroy: removing {body}");
                    ctx.world.destroy_body(body);
                    ctx.motors.remove(body);
                }
            }
        }
        EventResult::Handled
    }

    pub(super) fn draw(&self, surface: &mut dyn Surface, settings: &ToolSettings) {
        if self.trail.len() > 1 {
            let points: Vec<Point> = self.trail.iter().copied().collect();
            surface.draw_polyline(settings.erase_color, &points, OVERLAY_WIDTH);
        }
    }

    pub(super) fn cancel(&mut self) {
        self.trail.clear();
    }

    pub(super) fn is_busy(&self) -> bool {
        !self.trail.is_empty()
    }

    /// Current erase trail, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &Point> {
        self.trail.iter()
    }
}
