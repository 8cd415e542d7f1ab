//! Ball state and the simulation context
//!
//! Everything a frame reads or mutates lives in [`SimState`], so the whole
//! simulation can be driven without a window or a timer.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::field::FieldBuffer;
use super::speed::Speed;
use crate::consts::*;
use crate::error::StartupError;

/// A single metaball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    radius: u32,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: u32) -> Self {
        Self { pos, vel, radius }
    }

    /// Radius in pixels, fixed for the lifetime of the ball
    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }
}

/// Fixed-size collection of balls for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BallSet {
    balls: Vec<Ball>,
}

impl BallSet {
    /// Spawn `count` balls in the bottom-right quadrant of a `width` x `height` canvas.
    ///
    /// Radii are drawn from `[MIN_RADIUS, MAX_RADIUS]` and both velocity
    /// components from `[-1, 0]`, so every ball starts drifting up and left.
    pub fn spawn(width: u32, height: u32, count: usize, rng: &mut Pcg32) -> Self {
        let mut balls = Vec::with_capacity(count);
        for _ in 0..count {
            let x = quadrant_coord(width, rng);
            let y = quadrant_coord(height, rng);
            let radius = rng.random_range(MIN_RADIUS..=MAX_RADIUS);
            let vel = Vec2::new(
                rng.random_range(-1.0f32..=0.0),
                rng.random_range(-1.0f32..=0.0),
            );
            balls.push(Ball::new(Vec2::new(x, y), vel, radius));
        }
        Self { balls }
    }

    pub fn from_balls(balls: Vec<Ball>) -> Self {
        Self { balls }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Ball] {
        &self.balls
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Mutable access, reserved for the physics integrator
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Ball] {
        &mut self.balls
    }
}

/// Uniform coordinate in `[dim / 2, dim)`
fn quadrant_coord(dim: u32, rng: &mut Pcg32) -> f32 {
    let half = dim / 2;
    let offset = if half > 0 { rng.random_range(0..half) } else { 0 };
    (half + offset) as f32
}

/// Canvas extent and the reflecting inset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub inset: f32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            inset: INSET,
        }
    }

    /// Allowed range for a center coordinate on an axis of length `dim`
    #[inline]
    pub fn center_range(&self, dim: f32, radius: f32) -> (f32, f32) {
        (radius + self.inset, dim - radius - self.inset)
    }
}

/// The owned simulation context: balls, field scratch buffer, bounds and speed
#[derive(Debug, Clone)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub balls: BallSet,
    pub field: FieldBuffer,
    pub bounds: Bounds,
    pub speed: Speed,
    /// Frames driven so far
    pub frame_count: u64,
}

impl SimState {
    /// Create a simulation with freshly spawned balls
    pub fn new(width: u32, height: u32, ball_count: usize, cell_size: u32, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let balls = BallSet::spawn(width, height, ball_count, &mut rng);
        Self::with_balls(width, height, cell_size, balls, seed)
    }

    /// Like [`SimState::new`], but an oversized field grid is reported
    /// instead of aborting
    pub fn try_new(
        width: u32,
        height: u32,
        ball_count: usize,
        cell_size: u32,
        seed: u64,
    ) -> Result<Self, StartupError> {
        let field = FieldBuffer::try_new(width, height, cell_size)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        Ok(Self {
            seed,
            balls: BallSet::spawn(width, height, ball_count, &mut rng),
            field,
            bounds: Bounds::new(width, height),
            speed: Speed::default(),
            frame_count: 0,
        })
    }

    /// Create a simulation around an explicit set of balls
    pub fn with_balls(width: u32, height: u32, cell_size: u32, balls: BallSet, seed: u64) -> Self {
        Self {
            seed,
            balls,
            field: FieldBuffer::new(width, height, cell_size),
            bounds: Bounds::new(width, height),
            speed: Speed::default(),
            frame_count: 0,
        }
    }
}
