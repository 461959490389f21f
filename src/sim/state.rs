//! Match state and core simulation types
//!
//! Everything the tick mutates lives in [`GameState`]. Renderers read a
//! [`RenderSnapshot`] and never touch the state itself.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::physics::Character;
use super::rng::SeededRandom;
use super::terrain::{Platform, SIDE_MARGIN, generate_layout};
use crate::arena::ArenaConfig;
use crate::error::MatchError;

/// Slots in a standard match
pub const DEFAULT_PLATFORM_COUNT: usize = 20;

/// Lifecycle of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Building the platform layout
    Initializing,
    /// Ticking
    Playing,
    /// Character fell off screen (terminal)
    GameOver,
}

/// Visible play area in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 800.0,
        }
    }
}

/// Everything fixed at match start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParams {
    /// Session seed shared by both players
    pub seed: u32,
    pub user_id: u64,
    pub arena: ArenaConfig,
    pub platform_count: usize,
    pub viewport: Viewport,
}

impl MatchParams {
    pub fn new(seed: u32, user_id: u64, arena: ArenaConfig) -> Self {
        Self {
            seed,
            user_id,
            arena,
            platform_count: DEFAULT_PLATFORM_COUNT,
            viewport: Viewport::default(),
        }
    }

    pub fn with_platform_count(mut self, platform_count: usize) -> Self {
        self.platform_count = platform_count;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.platform_count == 0 {
            return Err(MatchError::NoPlatforms);
        }
        self.arena.validate()?;

        let Viewport { width, height } = self.viewport;
        let usable = width - self.arena.platform_width - 2.0 * SIDE_MARGIN;
        if !width.is_finite()
            || !height.is_finite()
            || height <= 0.0
            || usable <= 0.0
            || width < self.arena.character_size
        {
            return Err(MatchError::InvalidViewport { width, height });
        }
        Ok(())
    }
}

/// Something collaborators outside the simulation care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score went up
    ScoreChanged { score: u64 },
    /// Character left the ground
    Jumped,
    /// Character touched down on a slot after being airborne
    Landed { slot: usize },
    /// Match ended; emitted exactly once
    Death { final_score: u64, user_id: u64 },
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub params: MatchParams,
    pub rng: SeededRandom,
    pub phase: GamePhase,
    pub character: Character,
    /// Fixed-size slot array; recycling overwrites in place
    pub platforms: Vec<Platform>,
    pub camera: Camera,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Placements that waived the spacing rule
    pub relaxed_placements: u32,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Seed the match, lay out the platforms, place the character above the
    /// first platform and start playing.
    pub fn initialize(params: MatchParams) -> Result<Self, MatchError> {
        params.validate()?;

        let mut state = Self {
            rng: SeededRandom::new(params.seed as i64),
            phase: GamePhase::Initializing,
            character: Character::new(0.0, 0.0),
            platforms: Vec::new(),
            camera: Camera::new(),
            score: 0,
            time_ticks: 0,
            relaxed_placements: 0,
            events: Vec::new(),
            params,
        };

        let arena = &state.params.arena;
        let viewport = state.params.viewport;
        let layout = generate_layout(
            &mut state.rng,
            arena,
            &viewport,
            state.params.platform_count,
        );
        state.platforms = layout.platforms;
        state.relaxed_placements = layout.relaxed;

        let first = state.platforms[0];
        state.character = Character::new(
            viewport.width / 2.0 - arena.character_size / 2.0,
            first.top() - arena.character_size,
        );

        state.phase = GamePhase::Playing;
        log::info!(
            "Match started: seed={} arena={} platforms={} user={}",
            state.params.seed,
            state.params.arena.id,
            state.platforms.len(),
            state.params.user_id
        );
        Ok(state)
    }

    pub fn arena(&self) -> &ArenaConfig {
        &self.params.arena
    }

    pub fn viewport(&self) -> &Viewport {
        &self.params.viewport
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Screen y past which the character is dead
    pub fn death_line(&self) -> f64 {
        self.params.viewport.height + self.params.arena.character_size
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase,
            character: self.character.pos,
            camera_offset: self.camera.offset,
            platforms: self.platforms.iter().map(|p| p.pos).collect(),
            score: self.score,
            time_ticks: self.time_ticks,
        }
    }
}

/// Read-only view handed to the renderer each frame (world space)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub character: DVec2,
    pub camera_offset: f64,
    pub platforms: Vec<DVec2>,
    pub score: u64,
    pub time_ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u32) -> MatchParams {
        MatchParams::new(seed, 7, ArenaConfig::default())
    }

    #[test]
    fn test_initialize_places_character() {
        let state = GameState::initialize(params(42)).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.platforms.len(), DEFAULT_PLATFORM_COUNT);
        assert_eq!(state.character.pos.x, 180.0);
        assert_eq!(state.character.pos.y, state.platforms[0].top() - 40.0);
        assert_eq!(state.score, 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_same_seed_same_match() {
        let a = GameState::initialize(params(1234)).unwrap();
        let b = GameState::initialize(params(1234)).unwrap();
        assert_eq!(a.platforms, b.platforms);
        assert_eq!(a.rng, b.rng);
    }

    #[test]
    fn test_rejects_zero_platforms() {
        let err = GameState::initialize(params(1).with_platform_count(0)).unwrap_err();
        assert_eq!(err, MatchError::NoPlatforms);
    }

    #[test]
    fn test_rejects_bad_arena_and_viewport() {
        let mut p = params(1);
        p.arena.jump_height = -1.0;
        assert!(matches!(
            GameState::initialize(p),
            Err(MatchError::InvalidArena { .. })
        ));

        let p = params(1).with_viewport(Viewport {
            width: 90.0,
            height: 800.0,
        });
        assert!(matches!(
            GameState::initialize(p),
            Err(MatchError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let state = GameState::initialize(params(3)).unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.platforms.len(), state.platforms.len());
        assert_eq!(snapshot.platforms[5], state.platforms[5].pos);
        assert_eq!(snapshot.character, state.character.pos);

        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["platforms"].as_array().unwrap().len(), 20);
    }
}
