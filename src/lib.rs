//! Sky Hop - an endless vertical platformer for head-to-head sessions
//!
//! Core modules:
//! - `sim`: Deterministic simulation (RNG, terrain, physics, camera, game state)
//! - `game`: Fixed-timestep driver, input latching, opponent HUD state
//! - `arena`: Arena presets and difficulty tuning
//! - `input`: Direction/jump signals and pose mapping
//! - `protocol`: Messages exchanged with the embedding page and session relay
//! - `web`: Browser bindings (wasm32 only)

pub mod arena;
pub mod error;
pub mod game;
pub mod highscores;
pub mod input;
pub mod protocol;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use arena::{ArenaConfig, ArenaTable, Difficulty};
pub use error::{ConfigError, MatchError};
pub use game::Game;
pub use highscores::HighScores;
pub use input::{Direction, TickInput};
pub use settings::{ControlScheme, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds
    pub const TICK_MS: f64 = 16.0;
    /// Longest frame the driver will simulate; anything beyond is dropped
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
