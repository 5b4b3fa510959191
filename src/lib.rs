//! Heart Arcade - game-state engines for three casual minigames
//!
//! Core modules:
//! - `sim`: Deterministic engines (match-3 cascades, block placement, darts)
//! - `session`: Move budgets, win/loss evaluation, one-shot level completion
//! - `rewards`: Contract with the external progression collaborator
//! - `persistence`: Save/resume with a versioned JSON envelope
//! - `settings`: Data-driven game balance

pub mod error;
pub mod persistence;
pub mod rewards;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, PersistenceError, RewardsError, SessionError};
pub use rewards::{Completion, InMemoryRewards, LevelCode, LevelRewards};
pub use session::{MoveBudget, Outcome, Session, SessionPhase};
pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Match-3 grid is `MATCH_GRID_SIZE` x `MATCH_GRID_SIZE`
    pub const MATCH_GRID_SIZE: usize = 8;
    /// Number of heart colours on the match-3 board
    pub const HEART_COLOR_COUNT: usize = 5;
    /// Shortest run that clears
    pub const MIN_RUN: usize = 3;
    /// Hard cap on cascade generations per swap
    pub const MAX_CASCADE_GENERATIONS: usize = 64;
    pub const MATCH_DEFAULT_MOVES: u32 = 25;

    /// Block puzzle board is `PLACEMENT_BOARD_SIZE` x `PLACEMENT_BOARD_SIZE`
    pub const PLACEMENT_BOARD_SIZE: usize = 10;
    /// Pieces dealt per hand
    pub const HAND_SIZE: usize = 3;
    pub const PLACEMENT_DEFAULT_MOVES: u32 = 40;
    pub const PLACEMENT_DEFAULT_TARGET_LINES: u32 = 8;

    /// Dart board size in pixels (square, board centered)
    pub const DART_BOARD_SIZE: f32 = 500.0;
    /// Board radius in pixels
    pub const DART_BOARD_RADIUS: f32 = DART_BOARD_SIZE / 2.0;

    /// Regulation board dimensions (mm), scaled onto the pixel board
    pub const BOARD_RADIUS_MM: f32 = 170.0;
    pub const INNER_BULL_RADIUS_MM: f32 = 12.7;
    pub const OUTER_BULL_RADIUS_MM: f32 = 31.8;
    pub const TRIPLE_RING_INNER_MM: f32 = 99.0;
    pub const TRIPLE_RING_OUTER_MM: f32 = 107.0;
    pub const DOUBLE_RING_INNER_MM: f32 = 162.0;
    pub const DOUBLE_RING_OUTER_MM: f32 = 170.0;

    /// 501 down
    pub const DART_STARTING_SCORE: u32 = 501;
    pub const DARTS_PER_TURN: usize = 3;
    /// Default bot skill (0 = random, 1 = perfect)
    pub const BOT_DEFAULT_SKILL: f32 = 0.65;
    /// Jitter standard deviation in pixels at skill 0
    pub const BOT_DEFAULT_JITTER: f32 = 30.0;

    /// Hearts granted for a first-time level completion
    pub const LEVEL_COMPLETION_HEARTS: u32 = 10;
    /// Balance the intro flow tops the player up to
    pub const INTRO_HEARTS: u32 = 30;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Convert polar (r, theta) to a screen-space offset (y grows downward)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert a screen-space offset to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Clockwise heading of an offset measured from 12 o'clock, in [0, 2π)
#[inline]
pub fn heading_from_top(offset: Vec2) -> f32 {
    let (_, theta) = cartesian_to_polar(offset);
    normalize_angle(theta + std::f32::consts::FRAC_PI_2)
}

/// Screen-space offset for a clockwise heading from 12 o'clock
#[inline]
pub fn offset_from_heading(r: f32, heading: f32) -> Vec2 {
    polar_to_cartesian(r, heading - std::f32::consts::FRAC_PI_2)
}
