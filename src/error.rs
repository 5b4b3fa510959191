//! Error types
//!
//! Only construction mistakes, collaborator failures and corrupt saves are
//! errors. Illegal swaps, blocked placements, misses and busts are ordinary
//! game outcomes and are reported through the engines' outcome enums.

use thiserror::Error;

use crate::rewards::LevelCode;
use crate::sim::match3::HeartColor;

/// Invalid engine or settings configuration, caught at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("piece shape has no rows or columns")]
    EmptyShape,
    #[error("piece shape rows have different lengths")]
    RaggedShape,
    #[error("piece shape has no filled cells")]
    HollowShape,
    #[error("piece shape is {rows}x{cols}, larger than the board")]
    OversizedShape { rows: usize, cols: usize },
    #[error("goal colour {0:?} listed more than once")]
    DuplicateGoal(HeartColor),
    #[error("board pattern invalid: {0}")]
    BoardPattern(String),
    #[error("at least one goal is required")]
    NoGoals,
    #[error("goal target for {0:?} must be positive")]
    ZeroGoalTarget(HeartColor),
    #[error("hand must hold 1 to {max} pieces, got {got}")]
    InvalidHand { got: usize, max: usize },
    #[error("move budget must be positive")]
    ZeroMoves,
    #[error("line target must be positive")]
    ZeroLineTarget,
    #[error("catalog must contain at least one entry")]
    EmptyCatalog,
    #[error("catalog weights are invalid: {0}")]
    InvalidWeights(String),
    #[error("skill factor {0} outside [0, 1]")]
    SkillOutOfRange(f32),
    #[error("jitter must be finite and non-negative, got {0}")]
    InvalidJitter(f32),
    #[error("starting score must be positive")]
    ZeroStartingScore,
    #[error("settings JSON is invalid: {0}")]
    Json(String),
}

/// Failure reported by the external progression collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardsError {
    #[error("currency amount must be positive, got {0}")]
    InvalidAmount(i64),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Failure while settling a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The win stands locally; the reward can be retried
    #[error("completing {level} failed: {source}")]
    Rewards {
        level: LevelCode,
        #[source]
        source: RewardsError,
    },
    #[error("no failed reward to retry")]
    NothingToRetry,
}

/// Failure while loading or saving game state
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
