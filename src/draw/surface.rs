//! Drawing surface abstraction.
//!
//! Tools and the physics world only ever talk to a [`Surface`]; the concrete
//! backend (Cairo image surface, or a recording surface in tests) decides how
//! the primitives end up on screen. All coordinates are device pixels.

use super::color::Color;
use crate::util::Point;

/// Primitive drawing operations consumed by the world renderer and tool overlays.
pub trait Surface {
    /// Fills the whole surface with `color`.
    fn clear(&mut self, color: Color);

    /// Straight line between two points.
    fn draw_line(&mut self, color: Color, from: Point, to: Point, width: f64);

    /// Open polyline through `points`.
    fn draw_polyline(&mut self, color: Color, points: &[Point], width: f64);

    /// Closed polygon outline; a `width` of zero fills the polygon instead.
    fn draw_polygon(&mut self, color: Color, points: &[Point], width: f64);

    /// Circle outline; a `width` of zero fills the circle instead.
    fn draw_circle(&mut self, color: Color, center: Point, radius: f64, width: f64);
}

/// Draws the arrow-shaped software cursor with its tip at `tip`.
pub fn draw_cursor(surface: &mut dyn Surface, tip: Point) {
    const OUTLINE: [(f64, f64); 7] = [
        (0.0, 0.0),
        (0.0, 16.0),
        (4.0, 12.0),
        (7.0, 19.0),
        (10.0, 18.0),
        (7.0, 11.0),
        (12.0, 11.0),
    ];
    let points: Vec<Point> = OUTLINE
        .iter()
        .map(|&(dx, dy)| tip.offset(dx, dy))
        .collect();
    surface.draw_polygon(super::color::WHITE, &points, 0.0);
    surface.draw_polygon(super::color::BLACK, &points, 1.0);
}
