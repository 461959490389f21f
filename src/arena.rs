//! Arena presets and difficulty scaling
//!
//! An arena is the physics and platform-size preset chosen once per match by
//! id. The built-in table mirrors the arenas the session service hands out;
//! a JSON table can override or extend it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MatchError};
use crate::sim::terrain::reach_ceiling;

/// Arena used when a session names nothing we know
pub const FALLBACK_ARENA: &str = "1";

/// Immutable per-match physics and geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub id: String,
    /// Added to vertical velocity every tick
    pub gravity: f64,
    /// Jump impulse magnitude (units/tick)
    pub jump_height: f64,
    /// Horizontal units per tick at full lean
    pub move_speed: f64,
    pub platform_width: f64,
    pub platform_height: f64,
    pub character_size: f64,
    /// Vertical spacing range of the initial layout
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            id: "2".to_string(),
            gravity: 0.8,
            jump_height: 15.0,
            move_speed: 8.0,
            platform_width: 60.0,
            platform_height: 20.0,
            character_size: 40.0,
            min_distance: 50.0,
            max_distance: 90.0,
        }
    }
}

impl ArenaConfig {
    /// Reject configs that would build a degenerate or unwinnable match
    pub fn validate(&self) -> Result<(), MatchError> {
        let fields = [
            ("gravity", self.gravity),
            ("jump_height", self.jump_height),
            ("move_speed", self.move_speed),
            ("platform_width", self.platform_width),
            ("platform_height", self.platform_height),
            ("character_size", self.character_size),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(MatchError::InvalidArena { field, value });
            }
        }
        if self.max_distance < self.min_distance {
            return Err(MatchError::InvalidArena {
                field: "max_distance",
                value: self.max_distance,
            });
        }

        let ceiling = reach_ceiling(self.jump_height, self.gravity);
        if self.min_distance > ceiling {
            return Err(MatchError::Unreachable {
                min_distance: self.min_distance,
                ceiling,
            });
        }
        Ok(())
    }

    /// Copy of this arena with a difficulty preset applied
    pub fn with_difficulty(&self, difficulty: Difficulty) -> Self {
        let m = difficulty.modifiers();
        Self {
            gravity: self.gravity * m.gravity,
            jump_height: self.jump_height * m.jump,
            move_speed: self.move_speed * m.move_speed,
            min_distance: self.min_distance * m.spacing,
            max_distance: self.max_distance * m.spacing,
            ..self.clone()
        }
    }
}

/// Difficulty preset layered over an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Multipliers a difficulty applies to an arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyModifiers {
    pub gravity: f64,
    pub jump: f64,
    pub move_speed: f64,
    pub spacing: f64,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "default" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Number of platform slots for a match at this difficulty
    pub fn platform_count(&self) -> usize {
        match self {
            Difficulty::Easy => 25,
            Difficulty::Normal => 20,
            Difficulty::Hard => 18,
        }
    }

    pub fn modifiers(&self) -> DifficultyModifiers {
        match self {
            Difficulty::Easy => DifficultyModifiers {
                gravity: 0.9,
                jump: 1.05,
                move_speed: 0.9,
                spacing: 0.85,
            },
            Difficulty::Normal => DifficultyModifiers {
                gravity: 1.0,
                jump: 1.0,
                move_speed: 1.0,
                spacing: 1.0,
            },
            Difficulty::Hard => DifficultyModifiers {
                gravity: 1.15,
                jump: 0.95,
                move_speed: 1.1,
                spacing: 1.2,
            },
        }
    }
}

/// Arena presets keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaTable {
    arenas: BTreeMap<String, ArenaConfig>,
}

impl ArenaTable {
    /// The arenas shipped with the game
    pub fn builtin() -> Self {
        let mut arenas = BTreeMap::new();

        arenas.insert(
            "1".to_string(),
            ArenaConfig {
                id: "1".to_string(),
                gravity: 0.5,
                jump_height: 20.0,
                move_speed: 15.0,
                platform_width: 160.0,
                platform_height: 32.0,
                ..ArenaConfig::default()
            },
        );
        // Arenas 2-10 share the standard physics and differ only in art
        for n in 2..=10 {
            let id = n.to_string();
            arenas.insert(
                id.clone(),
                ArenaConfig {
                    id,
                    ..ArenaConfig::default()
                },
            );
        }
        arenas.insert(
            "earth".to_string(),
            ArenaConfig {
                id: "earth".to_string(),
                gravity: 0.35,
                jump_height: 12.0,
                move_speed: 5.0,
                ..ArenaConfig::default()
            },
        );
        arenas.insert(
            "moon".to_string(),
            ArenaConfig {
                id: "moon".to_string(),
                gravity: 0.15,
                jump_height: 10.0,
                move_speed: 7.0,
                min_distance: 80.0,
                max_distance: 140.0,
                ..ArenaConfig::default()
            },
        );

        Self { arenas }
    }

    /// Parse a JSON object of `id -> arena`. Missing fields take the standard
    /// arena's values; every entry is validated.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut table: Self = serde_json::from_str(json)?;
        for (id, arena) in table.arenas.iter_mut() {
            arena.id = id.clone();
            arena.validate()?;
        }
        log::info!("Parsed {} arena(s)", table.arenas.len());
        Ok(table)
    }

    /// Load a JSON arena table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::info!("Loading arenas from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Add or replace arenas from another table
    pub fn extend(&mut self, other: ArenaTable) {
        self.arenas.extend(other.arenas);
    }

    pub fn get(&self, id: &str) -> Result<&ArenaConfig, MatchError> {
        self.arenas
            .get(id)
            .ok_or_else(|| MatchError::UnknownArena(id.to_string()))
    }

    /// Look up an arena, falling back to [`FALLBACK_ARENA`] for unknown ids
    pub fn get_or_fallback(&self, id: &str) -> Result<&ArenaConfig, MatchError> {
        match self.get(id) {
            Ok(arena) => Ok(arena),
            Err(_) => {
                log::warn!("Unknown arena `{}`, using `{}`", id, FALLBACK_ARENA);
                self.get(FALLBACK_ARENA)
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.arenas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }
}
