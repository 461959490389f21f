//! Character movement, gravity and platform landing
//!
//! World space: y grows downward, so climbing means y getting smaller and a
//! falling character has positive `velocity_y`. Platforms are one-way: they
//! only catch a character coming down onto their top edge.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::terrain::Platform;
use crate::arena::ArenaConfig;
use crate::input::{Direction, TickInput};

/// Minimum ticks between two jumps (~400 ms at the 16 ms tick)
pub const JUMP_COOLDOWN_TICKS: u64 = 25;
/// A falling character still lands if its feet were up to this far below
/// the platform top on the previous tick
pub const LANDING_TOLERANCE: f64 = 5.0;
/// Platform edges shaved off the landing span on each side
pub const EDGE_INSET: f64 = 5.0;

/// The player character (world-space top-left)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub pos: DVec2,
    pub velocity_y: f64,
    pub on_platform: bool,
    /// Slot of the platform last landed on
    pub last_platform_hit: Option<usize>,
    /// Tick of the last accepted jump
    pub last_jump_tick: Option<u64>,
}

impl Character {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            velocity_y: 0.0,
            on_platform: false,
            last_platform_hit: None,
            last_jump_tick: None,
        }
    }

    pub fn screen_y(&self, camera_offset: f64) -> f64 {
        self.pos.y + camera_offset
    }

    /// Whether the jump cooldown has run out at `tick`
    pub fn jump_ready(&self, tick: u64) -> bool {
        self.last_jump_tick
            .is_none_or(|last| tick.saturating_sub(last) >= JUMP_COOLDOWN_TICKS)
    }
}

/// What happened to the character during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsOutcome {
    /// Slot landed on this tick
    pub landed: Option<usize>,
    pub jumped: bool,
}

/// Move horizontally, clamped to the viewport
pub fn apply_horizontal(
    character: &mut Character,
    direction: Direction,
    speed: f64,
    viewport_width: f64,
    size: f64,
) {
    match direction {
        Direction::Left => {
            character.pos.x = (character.pos.x - speed).max(0.0);
        }
        Direction::Right => {
            character.pos.x = (character.pos.x + speed).min(viewport_width - size);
        }
        Direction::None => {}
    }
}

/// First platform the character lands on while moving from its current y to
/// `next_y`, if any
pub fn find_landing(
    character: &Character,
    next_y: f64,
    platforms: &[Platform],
    arena: &ArenaConfig,
) -> Option<usize> {
    let size = arena.character_size;
    let bottom = character.pos.y + size;
    let next_bottom = next_y + size;
    let left = character.pos.x;
    let right = left + size;

    platforms.iter().position(|p| {
        let top = p.top();
        let was_above = bottom <= top + LANDING_TOLERANCE;
        let will_be_below = next_bottom >= top;
        let overlaps =
            right > p.pos.x + EDGE_INSET && left < p.pos.x + arena.platform_width - EDGE_INSET;
        was_above && will_be_below && overlaps
    })
}

/// Apply gravity and resolve landing. Returns the slot landed on.
pub fn integrate(
    character: &mut Character,
    platforms: &[Platform],
    arena: &ArenaConfig,
) -> Option<usize> {
    let next_velocity = character.velocity_y + arena.gravity;
    let next_y = character.pos.y + next_velocity;

    let landing = if next_velocity > 0.0 {
        find_landing(character, next_y, platforms, arena)
    } else {
        None
    };

    match landing {
        Some(slot) => {
            character.pos.y = platforms[slot].top() - arena.character_size;
            character.velocity_y = 0.0;
            character.on_platform = true;
            character.last_platform_hit = Some(slot);
        }
        None => {
            character.pos.y = next_y;
            character.velocity_y = next_velocity;
            character.on_platform = false;
        }
    }
    landing
}

/// Launch the character if it stands on a platform and the cooldown allows
pub fn try_jump(character: &mut Character, jump_height: f64, tick: u64) -> bool {
    if !character.on_platform || !character.jump_ready(tick) {
        return false;
    }
    character.velocity_y = -jump_height;
    character.on_platform = false;
    character.last_jump_tick = Some(tick);
    true
}

/// Advance the character by one tick
pub fn step_character(
    character: &mut Character,
    input: &TickInput,
    platforms: &[Platform],
    arena: &ArenaConfig,
    viewport_width: f64,
    tick: u64,
) -> PhysicsOutcome {
    let speed = arena.move_speed * input.speed_scale.unwrap_or(1.0);
    apply_horizontal(
        character,
        input.direction,
        speed,
        viewport_width,
        arena.character_size,
    );

    let landed = integrate(character, platforms, arena);
    let jumped = input.jump && try_jump(character, arena.jump_height, tick);

    PhysicsOutcome { landed, jumped }
}
