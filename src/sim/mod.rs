//! Deterministic simulation module
//!
//! Ball motion, field sampling and contour extraction. This module must stay
//! free of rendering and platform dependencies:
//! - Seeded RNG only
//! - Stable iteration order (balls in creation order, cells row by row)
//! - Buffers sized once at start-up

pub mod contour;
pub mod field;
pub mod physics;
pub mod speed;
pub mod state;

pub use contour::{
    CASE_TABLE, Cell, CenterSampled, ContourExtractor, Edge, EdgePair, SaddlePolicy, Segment,
    Segments, SeparateSaddles, case_index, interpolate, is_saddle,
};
pub use field::{FieldBuffer, ball_influence, influence_at};
pub use physics::{integrate, step_ball};
pub use speed::Speed;
pub use state::{Ball, BallSet, Bounds, SimState};
