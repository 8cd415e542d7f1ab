//! User-adjustable speed
//!
//! Speed scales the tick cadence, never the per-tick displacement.

use std::time::Duration;

use crate::consts::{MAX_SPEED, MIN_SPEED};

/// Speed multiplier clamped to `[MIN_SPEED, MAX_SPEED]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Speed(u32);

impl Default for Speed {
    fn default() -> Self {
        Self(MIN_SPEED)
    }
}

impl Speed {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(MIN_SPEED, MAX_SPEED))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increase(&mut self) {
        *self = Self::new(self.0.saturating_add(1));
    }

    pub fn decrease(&mut self) {
        *self = Self::new(self.0.saturating_sub(1));
    }

    /// Scroll input: wheel down (positive delta) slows, wheel up speeds up
    pub fn apply_wheel(&mut self, delta_y: f64) {
        if delta_y > 0.0 {
            self.decrease();
        } else if delta_y < 0.0 {
            self.increase();
        }
    }

    /// Tick period for a base refresh interval, never below one millisecond
    pub fn tick_interval_ms(self, refresh_ms: u32) -> u32 {
        (refresh_ms / self.0).max(1)
    }

    pub fn tick_interval(self, refresh_ms: u32) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms(refresh_ms)))
    }
}
