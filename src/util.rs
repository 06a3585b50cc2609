//! Geometry helpers shared by the tools and the physics backend.
//!
//! This module provides:
//! - [`Point`], the pixel/world coordinate pair used throughout the crate
//! - Distance and triangle construction used by the shape tools
//! - Rectangle normalisation for box gestures
//! - Polygon translation, area and centroid calculations

use serde::{Deserialize, Serialize};

/// A 2D point (or vector) with floating-point components.
///
/// Pixel-space points come straight from pointer events (rounded to whole
/// pixels), world-space points are produced by the physics backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snaps the point to whole pixels.
    pub fn rounded(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Vector from `other` to `self`.
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f64, y as f64)
    }
}

// ============================================================================
// Distances and lines
// ============================================================================

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Builds an equilateral triangle from a line segment.
///
/// `start` becomes the midpoint of one side and `end` the opposite vertex, so
/// the segment is the triangle's altitude. The remaining two vertices sit on
/// the perpendicular through `start`, `tan(30°) * |end - start|` away on each
/// side.
///
/// # Returns
/// The three vertices `[end, left, right]`.
pub fn triangle_from_line(start: Point, end: Point) -> [Point; 3] {
    const TAN_30: f64 = 0.577_35;
    let half_x = TAN_30 * (end.y - start.y);
    let half_y = TAN_30 * (end.x - start.x);
    [
        end,
        Point::new(start.x + half_x, start.y - half_y),
        Point::new(start.x - half_x, start.y + half_y),
    ]
}

/// Symmetrically stretches a segment about its midpoint to at least `min_length`.
///
/// Segments that are already long enough, and zero-length segments (which have
/// no direction to stretch along), are returned unchanged.
pub fn extend_to_min_length(start: Point, end: Point, min_length: f64) -> (Point, Point) {
    let length = distance(start, end);
    if length >= min_length || length == 0.0 {
        return (start, end);
    }

    let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
    let scale = min_length / length;
    let stretch = |p: Point| Point::new(mid.x - (mid.x - p.x) * scale, mid.y - (mid.y - p.y) * scale);
    (stretch(start), stretch(end))
}

// ============================================================================
// Rectangles
// ============================================================================

/// Axis-aligned rectangle with a non-negative size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Corner points in drawing order.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// Normalises the rectangle spanned by two corners, handling drags in any direction.
pub fn normalized_rect(a: Point, b: Point) -> Rect {
    Rect {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
        width: (a.x - b.x).abs(),
        height: (a.y - b.y).abs(),
    }
}

// ============================================================================
// Polygons
// ============================================================================

/// Translates `vertices` so that their last vertex lands on `target`.
pub fn translate_to(vertices: &[Point], target: Point) -> Vec<Point> {
    let Some(last) = vertices.last() else {
        return Vec::new();
    };
    let dx = target.x - last.x;
    let dy = target.y - last.y;
    vertices.iter().map(|p| p.offset(dx, dy)).collect()
}

/// Drops a trailing vertex that repeats the first one (closed outlines).
pub fn open_outline(vertices: &[Point]) -> &[Point] {
    match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) if vertices.len() > 1 && first == last => {
            &vertices[..vertices.len() - 1]
        }
        _ => vertices,
    }
}

/// Signed area of a simple polygon (shoelace formula).
pub fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area / 2.0
}

/// Area-weighted centroid, falling back to the vertex average for degenerate outlines.
pub fn centroid(vertices: &[Point]) -> Point {
    let n = vertices.len();
    if n == 0 {
        return Point::ORIGIN;
    }

    let area = signed_area(vertices);
    if area.abs() < f64::EPSILON {
        let sum = vertices
            .iter()
            .fold(Point::ORIGIN, |acc, p| acc.offset(p.x, p.y));
        return sum.scaled(1.0 / n as f64);
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    Point::new(cx / (6.0 * area), cy / (6.0 * area))
}
