//! Seeded random source shared between match peers
//!
//! Park-Miller minimal standard LCG. Both players of a session seed it with
//! the session seed, so the sequence must match the browser client draw for
//! draw: keep the arithmetic exactly as written.

use serde::{Deserialize, Serialize};

/// Modulus 2^31 - 1
pub const MODULUS: i64 = 2_147_483_647;
/// Park-Miller multiplier
pub const MULTIPLIER: i64 = 16_807;

/// Deterministic random source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    state: i64,
}

impl SeededRandom {
    /// Seed the generator. Zero and negative seeds are shifted into
    /// `(0, MODULUS)` so the sequence never collapses.
    pub fn new(seed: i64) -> Self {
        let mut state = seed % MODULUS;
        if state <= 0 {
            state += MODULUS - 1;
        }
        Self { state }
    }

    /// Next value in `[0, 1)`
    pub fn next(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER) % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    /// `min + next() * (max - min)`. Always consumes one draw, even when
    /// `min == max`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Raw generator state
    pub fn state(&self) -> i64 {
        self.state
    }
}
