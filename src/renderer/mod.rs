//! Rendering surfaces
//!
//! The frame driver only needs three operations from a surface: clear it,
//! draw a line, and present. The raster surface does this on the CPU; the
//! WebGPU surface batches lines into a line-list draw.

pub mod pipeline;
pub mod raster;
pub mod vertex;

use glam::Vec2;

pub use pipeline::LineRenderState;
pub use raster::RasterSurface;
pub use vertex::{Vertex, colors};

/// Minimal 2D line drawing target
pub trait Surface {
    type Error;

    fn clear(&mut self, color: [f32; 4]);

    fn draw_line(&mut self, a: Vec2, b: Vec2, color: [f32; 4]);

    /// Hand the finished frame to the display
    fn present(&mut self) -> Result<(), Self::Error>;
}
