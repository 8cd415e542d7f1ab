//! Scalar influence field sampled on a coarse grid
//!
//! Each vertex holds `Σ radius / distance` over all balls. The buffer is
//! allocated once from the canvas size and overwritten every frame.

use glam::Vec2;

use super::state::Ball;
use crate::consts::SINGULARITY_INFLUENCE;
use crate::error::{StartupError, try_filled};

fn grid_dims(width: u32, height: u32, cell_size: u32) -> (usize, usize) {
    (
        1 + (width / cell_size) as usize,
        1 + (height / cell_size) as usize,
    )
}

/// Dense row-major grid of field samples, addressed by (column, row)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBuffer {
    width: u32,
    height: u32,
    cell_size: u32,
    cols: usize,
    rows: usize,
    values: Vec<f32>,
}

impl FieldBuffer {
    /// Grid covering a `width` x `height` canvas with `cell_size` spacing.
    ///
    /// `cell_size` must be non-zero; settings validation guarantees it.
    pub fn new(width: u32, height: u32, cell_size: u32) -> Self {
        let (cols, rows) = grid_dims(width, height, cell_size);
        Self {
            width,
            height,
            cell_size,
            cols,
            rows,
            values: vec![0.0; cols * rows],
        }
    }

    /// Like [`FieldBuffer::new`], but an oversized grid is an error rather
    /// than an abort
    pub fn try_new(width: u32, height: u32, cell_size: u32) -> Result<Self, StartupError> {
        let (cols, rows) = grid_dims(width, height, cell_size);
        Ok(Self {
            width,
            height,
            cell_size,
            cols,
            rows,
            values: try_filled("field grid", cols, rows, 0.0)?,
        })
    }

    /// Grid with explicit samples, spanning `(cols - 1) * cell_size` by
    /// `(rows - 1) * cell_size` pixels. Returns `None` when `values` does not
    /// hold exactly `cols * rows` samples.
    pub fn from_values(cols: usize, rows: usize, cell_size: u32, values: Vec<f32>) -> Option<Self> {
        if cols == 0 || rows == 0 || cell_size == 0 || values.len() != cols * rows {
            return None;
        }
        Some(Self {
            width: (cols as u32 - 1) * cell_size,
            height: (rows as u32 - 1) * cell_size,
            cell_size,
            cols,
            rows,
            values,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Canvas size the grid was built for
    pub fn canvas(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.values[row * self.cols + col]
    }

    /// Canvas position of a grid vertex
    #[inline]
    pub fn vertex_pos(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            (col as u32 * self.cell_size) as f32,
            (row as u32 * self.cell_size) as f32,
        )
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Recompute every vertex from the current ball positions
    pub fn sample(&mut self, balls: &[Ball]) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let p = self.vertex_pos(col, row);
                self.values[row * self.cols + col] = influence_at(p, balls);
            }
        }
    }
}

/// Summed influence of all balls at `p`
pub fn influence_at(p: Vec2, balls: &[Ball]) -> f32 {
    balls.iter().map(|ball| ball_influence(p, ball)).sum()
}

/// `radius / distance`, saturating where `p` sits on the ball center
#[inline]
pub fn ball_influence(p: Vec2, ball: &Ball) -> f32 {
    let dist = p.distance(ball.pos);
    if dist <= f32::EPSILON {
        return SINGULARITY_INFLUENCE;
    }
    (ball.radius() as f32 / dist).min(SINGULARITY_INFLUENCE)
}
