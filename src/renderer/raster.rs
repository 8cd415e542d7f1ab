//! CPU framebuffer surface
//!
//! BGRx8888 pixels, Bresenham lines, no readback from the simulation side.

use std::convert::Infallible;

use glam::Vec2;

use super::Surface;
use super::vertex::pack_bgrx;
use crate::error::{StartupError, try_filled};

/// Software line rasterizer over a packed pixel buffer
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    lines_drawn: usize,
    frames_presented: u64,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            lines_drawn: 0,
            frames_presented: 0,
        }
    }

    /// Like [`RasterSurface::new`], but an oversized framebuffer is an error
    /// rather than an abort
    pub fn try_new(width: u32, height: u32) -> Result<Self, StartupError> {
        Ok(Self {
            width,
            height,
            pixels: try_filled("framebuffer", width as usize, height as usize, 0)?,
            lines_drawn: 0,
            frames_presented: 0,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Lines drawn since the last clear
    pub fn lines_drawn(&self) -> usize {
        self.lines_drawn
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, packed: u32) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.pixels[(y as u32 * self.width + x as u32) as usize] = packed;
        }
    }

    /// Bresenham between integer endpoints, clipped per pixel
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, packed: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx: i32 = if x0 < x1 { 1 } else { -1 };
        let sy: i32 = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut cx, mut cy) = (x0, y0);

        loop {
            self.plot(cx, cy, packed);
            if cx == x1 && cy == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                cx += sx;
            }
            if e2 <= dx {
                err += dx;
                cy += sy;
            }
        }
    }
}

impl Surface for RasterSurface {
    type Error = Infallible;

    fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(pack_bgrx(color));
        self.lines_drawn = 0;
    }

    fn draw_line(&mut self, a: Vec2, b: Vec2, color: [f32; 4]) {
        // Endpoints truncate to whole pixels
        self.line(a.x as i32, a.y as i32, b.x as i32, b.y as i32, pack_bgrx(color));
        self.lines_drawn += 1;
    }

    fn present(&mut self) -> Result<(), Infallible> {
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::colors;

    #[test]
    fn test_clear_fills() {
        let mut surface = RasterSurface::new(4, 3);
        surface.clear(colors::WHITE);
        assert!(surface.pixels().iter().all(|&p| p == 0x00ff_ffff));
        surface.clear(colors::BACKGROUND);
        assert!(surface.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_try_new() {
        let surface = RasterSurface::try_new(8, 6).unwrap();
        assert_eq!(surface.size(), (8, 6));
        assert_eq!(surface.pixels().len(), 48);
    }

    #[test]
    fn test_try_new_oversized() {
        let err = RasterSurface::try_new(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, StartupError::Allocation { what: "framebuffer", .. }));
    }

    #[test]
    fn test_horizontal_line() {
        let mut surface = RasterSurface::new(10, 10);
        surface.draw_line(Vec2::new(2.0, 5.0), Vec2::new(6.0, 5.0), colors::WHITE);
        for x in 2..=6 {
            assert_eq!(surface.pixel(x, 5), Some(0x00ff_ffff));
        }
        assert_eq!(surface.pixel(1, 5), Some(0));
        assert_eq!(surface.pixel(7, 5), Some(0));
        assert_eq!(surface.lines_drawn(), 1);
    }

    #[test]
    fn test_reversed_diagonal() {
        let mut surface = RasterSurface::new(10, 10);
        surface.draw_line(Vec2::new(4.0, 4.0), Vec2::new(0.0, 0.0), colors::WHITE);
        for i in 0..=4 {
            assert_eq!(surface.pixel(i, i), Some(0x00ff_ffff));
        }
    }

    #[test]
    fn test_offscreen_clipped() {
        let mut surface = RasterSurface::new(5, 5);
        surface.draw_line(Vec2::new(-3.0, 2.0), Vec2::new(8.0, 2.0), colors::WHITE);
        for x in 0..5 {
            assert_eq!(surface.pixel(x, 2), Some(0x00ff_ffff));
        }
        assert_eq!(surface.pixel(5, 2), None);
    }

    #[test]
    fn test_present_counts_frames() {
        let mut surface = RasterSurface::new(1, 1);
        surface.present().unwrap();
        surface.present().unwrap();
        assert_eq!(surface.frames_presented(), 2);
    }
}
