//! Ball integration with reflection off the inset boundary

use super::state::{Ball, BallSet, Bounds};
use crate::consts::VELOCITY_SCALE;

/// Advance every ball one step and bounce it off the walls
pub fn integrate(balls: &mut BallSet, bounds: &Bounds) {
    for ball in balls.as_mut_slice() {
        step_ball(ball, bounds);
    }
}

/// Move a single ball and reflect it on each axis independently
pub fn step_ball(ball: &mut Ball, bounds: &Bounds) {
    ball.pos += ball.vel * VELOCITY_SCALE;

    let radius = ball.radius() as f32;

    let (min_x, max_x) = bounds.center_range(bounds.width, radius);
    reflect_axis(&mut ball.pos.x, &mut ball.vel.x, min_x, max_x);

    let (min_y, max_y) = bounds.center_range(bounds.height, radius);
    reflect_axis(&mut ball.pos.y, &mut ball.vel.y, min_y, max_y);
}

/// Negate velocity and clamp the center back onto the wall it crossed
#[inline]
fn reflect_axis(pos: &mut f32, vel: &mut f32, min: f32, max: f32) {
    if *pos > max {
        *vel = -*vel;
        *pos = max;
    }
    if *pos < min {
        *vel = -*vel;
        *pos = min;
    }
}
