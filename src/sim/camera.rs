//! Vertical follow camera and height score
//!
//! The camera only ever scrolls up. Score is derived from the highest offset
//! reached, so it cannot go down even if the offset ever did.

use serde::{Deserialize, Serialize};

/// Character is kept at this fraction of the viewport height
pub const TARGET_FRACTION: f64 = 0.5;
/// Share of the remaining distance covered each tick
pub const SMOOTHING: f64 = 0.1;
/// Camera units per score point
pub const UNITS_PER_POINT: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World-to-screen vertical translation
    pub offset: f64,
    /// Highest offset reached so far
    pub max_offset: f64,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ease toward keeping the character on the target line. Does nothing
    /// while the character is at or below the line.
    pub fn follow(&mut self, character_y: f64, viewport_height: f64) {
        let target = viewport_height * TARGET_FRACTION;
        let diff = target - (character_y + self.offset);
        if diff > 0.0 {
            self.offset += diff * SMOOTHING;
        }
        self.max_offset = self.max_offset.max(self.offset);
    }

    pub fn score(&self) -> u64 {
        (self.max_offset / UNITS_PER_POINT).floor().max(0.0) as u64
    }

    pub fn to_screen(&self, world_y: f64) -> f64 {
        world_y + self.offset
    }
}
