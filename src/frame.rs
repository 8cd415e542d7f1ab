//! One frame of the screensaver
//!
//! Clear, sample the field, draw its contour, then advance the balls. The
//! picture therefore shows the positions from before this frame's physics
//! step.

use crate::renderer::{Surface, colors};
use crate::sim::{ContourExtractor, SimState, integrate};

/// What a frame produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Segments handed to the surface
    pub segments: usize,
    /// Saddle cells encountered while contouring
    pub saddle_cells: usize,
}

/// Drives the per-tick pipeline over a [`SimState`]
#[derive(Debug, Default)]
pub struct FrameDriver {
    pub extractor: ContourExtractor,
}

impl FrameDriver {
    pub fn new(extractor: ContourExtractor) -> Self {
        Self { extractor }
    }

    /// Run one tick and present it
    pub fn run_frame<S: Surface>(
        &self,
        state: &mut SimState,
        surface: &mut S,
    ) -> Result<FrameStats, S::Error> {
        let stats = self.draw(state, surface);
        integrate(&mut state.balls, &state.bounds);
        state.frame_count += 1;
        surface.present()?;

        log::trace!(
            "frame {}: {} segments, {} saddle cells",
            state.frame_count,
            stats.segments,
            stats.saddle_cells
        );
        Ok(stats)
    }

    /// Clear the surface and draw the contour for the current ball positions
    pub fn draw<S: Surface>(&self, state: &mut SimState, surface: &mut S) -> FrameStats {
        surface.clear(colors::BACKGROUND);
        state.field.sample(state.balls.as_slice());

        let mut segments = self.extractor.segments(&state.field);
        let mut count = 0;
        for segment in segments.by_ref() {
            surface.draw_line(segment.a, segment.b, segment.color);
            count += 1;
        }

        FrameStats {
            segments: count,
            saddle_cells: segments.saddle_cells(),
        }
    }
}
