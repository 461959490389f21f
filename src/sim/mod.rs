//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (shared with the opponent's client)
//! - Stable iteration order (by platform slot)
//! - No rendering or platform dependencies

pub mod camera;
pub mod physics;
pub mod rng;
pub mod state;
pub mod terrain;
pub mod tick;

pub use camera::Camera;
pub use physics::{Character, JUMP_COOLDOWN_TICKS, PhysicsOutcome, step_character};
pub use rng::SeededRandom;
pub use state::{
    DEFAULT_PLATFORM_COUNT, GameEvent, GamePhase, GameState, MatchParams, RenderSnapshot,
    Viewport,
};
pub use terrain::{Layout, Platform, generate_layout, max_jump_rise, reach_ceiling, recycle};
pub use tick::tick;
