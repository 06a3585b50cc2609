//! Drawing primitives (Cairo-based).
//!
//! This module defines the drawing types shared by the world renderer and the
//! tool overlays:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Surface`]: the primitive operations every frame is composed from
//! - [`CairoSurface`]: raster implementation that can be written out as PNG

pub mod color;
pub mod render;
pub mod surface;

// Re-export commonly used types at module level
pub use color::Color;
pub use render::CairoSurface;
pub use surface::{Surface, draw_cursor};

// Re-export color constants for public API
pub use color::{BLACK, BLUE, GREEN, GREY, ORANGE, RED, SKY, WHITE};
