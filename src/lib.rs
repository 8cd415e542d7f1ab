//! Metaballs - the classic metaball screensaver
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball motion, field sampling, marching squares)
//! - `frame`: Per-tick pipeline tying the simulation to a surface
//! - `renderer`: Drawing surfaces (CPU raster, WebGPU line list)
//! - `settings`: Start-up configuration
//! - `error`: Configuration and start-up failures

pub mod error;
pub mod frame;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, StartupError};
pub use frame::{FrameDriver, FrameStats};
pub use settings::{SaddleMode, Settings};

/// Simulation constants
pub mod consts {
    /// Field grid spacing in pixels
    pub const CELL_SIZE: u32 = 3;
    /// Field level traced by the contour
    pub const THRESHOLD: f32 = 1.0;
    /// Influence used where a grid vertex coincides with a ball center
    pub const SINGULARITY_INFLUENCE: f32 = 1.0e6;

    /// Ball radius range (inclusive)
    pub const MIN_RADIUS: u32 = 5;
    pub const MAX_RADIUS: u32 = 29;
    /// Displacement per tick is this multiple of the velocity
    pub const VELOCITY_SCALE: f32 = 5.0;
    /// Margin between the canvas edge and the reflecting wall
    pub const INSET: f32 = 50.0;
    /// Smallest canvas side that can hold the largest ball inside the walls
    pub const MIN_CANVAS_DIM: u32 = 2 * (MAX_RADIUS + INSET as u32);
    /// Largest accepted canvas side, the WebGPU default texture limit
    pub const MAX_CANVAS_DIM: u32 = 8192;

    /// Speed multiplier range
    pub const MIN_SPEED: u32 = 1;
    pub const MAX_SPEED: u32 = 16;

    pub const DEFAULT_BALL_COUNT: usize = 6;
    pub const DEFAULT_REFRESH_MS: u32 = 16;
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;
}
