//! Error types
//!
//! Only match setup and config loading can fail. Once a match is `Playing`
//! the simulation is infallible: death is a phase, not an error.

use thiserror::Error;

/// Rejected match parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("platform count must be at least 1")]
    NoPlatforms,

    #[error("arena field `{field}` must be positive and finite, got {value}")]
    InvalidArena { field: &'static str, value: f64 },

    #[error("minimum platform distance {min_distance} exceeds the reachable jump height {ceiling:.1}")]
    Unreachable { min_distance: f64, ceiling: f64 },

    #[error("viewport {width}x{height} cannot fit a platform")]
    InvalidViewport { width: f64, height: f64 },

    #[error("unknown arena `{0}`")]
    UnknownArena(String),
}

/// Failure loading an arena table or settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid arena: {0}")]
    Arena(#[from] MatchError),
}
