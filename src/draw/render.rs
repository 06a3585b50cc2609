//! Cairo-backed drawing surface.

use super::color::Color;
use super::surface::Surface;
use crate::util::Point;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Raster surface backed by a Cairo ARGB32 image.
///
/// Drawing errors reported by Cairo are ignored per call, the same way a
/// failed `stroke()` on a live window would just leave a frame incomplete.
pub struct CairoSurface {
    surface: cairo::ImageSurface,
    ctx: cairo::Context,
}

impl CairoSurface {
    /// Creates a blank surface of the given pixel size.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)
            .context("failed to create image surface")?;
        let ctx = cairo::Context::new(&surface).context("failed to create cairo context")?;
        Ok(Self { surface, ctx })
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    /// Writes the current contents as a PNG file.
    pub fn write_png(&self, path: &Path) -> Result<()> {
        self.surface.flush();
        let mut file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        self.surface
            .write_to_png(&mut file)
            .with_context(|| format!("failed to encode PNG {}", path.display()))?;
        Ok(())
    }

    /// Releases the drawing context and hands back the underlying image.
    pub fn into_image(self) -> cairo::ImageSurface {
        let Self { surface, ctx } = self;
        drop(ctx);
        surface.flush();
        surface
    }

    fn set_color(&self, color: Color) {
        self.ctx.set_source_rgba(color.r, color.g, color.b, color.a);
    }

    fn trace(&self, points: &[Point]) {
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return,
        };
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
    }

    fn finish(&self, width: f64) {
        if width > 0.0 {
            self.ctx.set_line_width(width);
            let _ = self.ctx.stroke();
        } else {
            let _ = self.ctx.fill();
        }
    }
}

impl Surface for CairoSurface {
    fn clear(&mut self, color: Color) {
        let _ = self.ctx.save();
        self.ctx.set_operator(cairo::Operator::Source);
        self.set_color(color);
        let _ = self.ctx.paint();
        let _ = self.ctx.restore();
    }

    fn draw_line(&mut self, color: Color, from: Point, to: Point, width: f64) {
        self.set_color(color);
        self.ctx.set_line_width(width);
        self.ctx.set_line_cap(cairo::LineCap::Round);
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        let _ = self.ctx.stroke();
    }

    fn draw_polyline(&mut self, color: Color, points: &[Point], width: f64) {
        if points.len() < 2 {
            return;
        }
        self.set_color(color);
        self.ctx.set_line_width(width);
        self.ctx.set_line_cap(cairo::LineCap::Round);
        self.ctx.set_line_join(cairo::LineJoin::Round);
        self.trace(points);
        let _ = self.ctx.stroke();
    }

    fn draw_polygon(&mut self, color: Color, points: &[Point], width: f64) {
        if points.len() < 2 {
            return;
        }
        self.set_color(color);
        self.ctx.set_line_join(cairo::LineJoin::Miter);
        self.trace(points);
        self.ctx.close_path();
        self.finish(width);
    }

    fn draw_circle(&mut self, color: Color, center: Point, radius: f64, width: f64) {
        if radius <= 0.0 {
            return;
        }
        self.set_color(color);
        self.ctx.new_sub_path();
        self.ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::PI * 2.0);
        self.finish(width);
    }
}
