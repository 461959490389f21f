//! Platform layout and infinite recycling
//!
//! The platform set is a fixed array of slots. A slot that scrolls off the
//! bottom of the screen is moved above the highest platform; slots are never
//! removed or added during a match.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::rng::SeededRandom;
use super::state::Viewport;
use crate::arena::ArenaConfig;

/// Horizontal margin kept free on both sides of the viewport
pub const SIDE_MARGIN: f64 = 20.0;
/// First platform sits this far above the bottom of the initial viewport
pub const BASELINE_OFFSET: f64 = 100.0;
/// A platform this far below the viewport is recycled
pub const RECYCLE_SLACK: f64 = 100.0;
/// Lower bound of the recycled gap (clamped to the reachable ceiling)
pub const MIN_RESPAWN_GAP: f64 = 60.0;
/// Upper bound of the recycled gap as a multiple of the jump impulse
pub const GAP_JUMP_FACTOR: f64 = 4.0;
/// Fraction of the peak jump rise a gap may use
pub const REACH_SAFETY: f64 = 0.9;
/// Candidates within this fraction of platform height vertically...
pub const MIN_VERTICAL_GAP_FACTOR: f64 = 0.8;
/// ...must be at least this fraction of platform width apart horizontally
pub const MIN_HORIZONTAL_GAP_FACTOR: f64 = 0.4;
/// Redraws before a crowded candidate is accepted anyway
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 50;

/// A platform slot (world-space top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: DVec2,
}

impl Platform {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
        }
    }

    pub fn top(&self) -> f64 {
        self.pos.y
    }

    pub fn screen_y(&self, camera_offset: f64) -> f64 {
        self.pos.y + camera_offset
    }
}

/// Peak height gained by one jump under the per-tick integrator.
///
/// The impulse is applied and gravity added before each move, so the rise is
/// `J-g + J-2g + ... ` while the terms stay positive. Never exceeds the
/// continuous bound `J^2 / 2g`.
pub fn max_jump_rise(jump_height: f64, gravity: f64) -> f64 {
    if jump_height <= 0.0 || gravity <= 0.0 {
        return 0.0;
    }
    let n = (jump_height / gravity).floor();
    n * jump_height - gravity * n * (n + 1.0) / 2.0
}

/// Largest vertical gap the generator may ever leave between platforms
pub fn reach_ceiling(jump_height: f64, gravity: f64) -> f64 {
    max_jump_rise(jump_height, gravity) * REACH_SAFETY
}

/// `(min, max)` spacing of the initial layout, capped to what a jump reaches
pub fn layout_gap_bounds(arena: &ArenaConfig) -> (f64, f64) {
    let hi = arena
        .max_distance
        .min(reach_ceiling(arena.jump_height, arena.gravity));
    (arena.min_distance.min(hi), hi)
}

/// `(min, max)` gap above the highest platform for a recycled slot
pub fn respawn_gap_bounds(arena: &ArenaConfig) -> (f64, f64) {
    let hi = (arena.jump_height * GAP_JUMP_FACTOR)
        .min(reach_ceiling(arena.jump_height, arena.gravity));
    (MIN_RESPAWN_GAP.min(hi), hi)
}

/// Spacing rule: a platform at `(x, y)` crowds `other` when they nearly share
/// a row and their centers are close.
pub fn crowds(x: f64, y: f64, other: &Platform, arena: &ArenaConfig) -> bool {
    let dy = (other.pos.y - y).abs();
    if dy > arena.platform_height * MIN_VERTICAL_GAP_FACTOR {
        return false;
    }
    let dx = (x - other.pos.x).abs();
    dx < arena.platform_width * MIN_HORIZONTAL_GAP_FACTOR
}

/// Result of placing one platform horizontally
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    /// Retries ran out and the spacing rule was waived
    pub relaxed: bool,
}

/// Draw an x for a platform at height `y`, redrawing while it crowds any of
/// `others` except slot `skip`.
fn place_x(
    rng: &mut SeededRandom,
    y: f64,
    others: &[Platform],
    skip: Option<usize>,
    arena: &ArenaConfig,
    viewport: &Viewport,
) -> Placement {
    let max_x = viewport.width - arena.platform_width - SIDE_MARGIN;
    let crowded = |x: f64| {
        others
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, p)| crowds(x, y, p, arena))
    };

    let mut x = rng.range(SIDE_MARGIN, max_x);
    let mut attempts = 0;
    while crowded(x) {
        if attempts >= MAX_PLACEMENT_ATTEMPTS {
            return Placement { x, relaxed: true };
        }
        x = rng.range(SIDE_MARGIN, max_x);
        attempts += 1;
    }
    Placement { x, relaxed: false }
}

/// Initial platform set
#[derive(Debug, Clone)]
pub struct Layout {
    pub platforms: Vec<Platform>,
    /// Placements that had to waive the spacing rule
    pub relaxed: u32,
}

/// Build the starting platforms: slot 0 on the baseline, each following slot
/// higher than the last by a random reachable distance.
pub fn generate_layout(
    rng: &mut SeededRandom,
    arena: &ArenaConfig,
    viewport: &Viewport,
    count: usize,
) -> Layout {
    let (min_gap, max_gap) = layout_gap_bounds(arena);
    let mut platforms = Vec::with_capacity(count);
    let mut relaxed = 0;
    let mut y = viewport.height - BASELINE_OFFSET;

    for i in 0..count {
        if i > 0 {
            y -= rng.range(min_gap, max_gap);
        }
        let placement = place_x(rng, y, &platforms, None, arena, viewport);
        if placement.relaxed {
            relaxed += 1;
            log::debug!("Platform {} placed without spacing at y={:.1}", i, y);
        }
        platforms.push(Platform::new(placement.x, y));
    }

    Layout { platforms, relaxed }
}

/// What one recycling pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecycleReport {
    /// `(slot, gap above the previous highest platform)`
    pub respawned: Vec<(usize, f64)>,
    pub relaxed: u32,
}

/// Move every slot that has fallen below the screen above the current
/// highest platform. Slots are handled in index order, each one seeing the
/// slots already moved this pass.
pub fn recycle(
    platforms: &mut [Platform],
    camera_offset: f64,
    rng: &mut SeededRandom,
    arena: &ArenaConfig,
    viewport: &Viewport,
) -> RecycleReport {
    let threshold = viewport.height + RECYCLE_SLACK;
    let (min_gap, max_gap) = respawn_gap_bounds(arena);
    let mut report = RecycleReport::default();

    for i in 0..platforms.len() {
        if platforms[i].screen_y(camera_offset) <= threshold {
            continue;
        }

        let highest = platforms
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| p.pos.y)
            .fold(f64::INFINITY, f64::min);
        // A single-slot match respawns relative to itself
        let highest = if highest.is_finite() {
            highest
        } else {
            platforms[i].pos.y
        };

        let gap = rng.range(min_gap, max_gap);
        let y = highest - gap;
        let placement = place_x(rng, y, platforms, Some(i), arena, viewport);
        if placement.relaxed {
            report.relaxed += 1;
        }
        platforms[i] = Platform::new(placement.x, y);
        report.respawned.push((i, gap));
        log::debug!("Recycled platform {} to y={:.1} (gap {:.1})", i, y, gap);
    }

    report
}
