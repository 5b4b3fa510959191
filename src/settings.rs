//! Game balance settings
//!
//! Defaults reproduce the shipped levels. A `Difficulty` preset scales the
//! move budgets and the dart bot; everything can also be loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::match3::{Goal, Goals, HeartColor};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Match-3 move budget
    pub fn match_moves(&self) -> u32 {
        match self {
            Difficulty::Easy => 30,
            Difficulty::Normal => MATCH_DEFAULT_MOVES,
            Difficulty::Hard => 20,
        }
    }

    /// Block puzzle move budget
    pub fn placement_moves(&self) -> u32 {
        match self {
            Difficulty::Easy => 50,
            Difficulty::Normal => PLACEMENT_DEFAULT_MOVES,
            Difficulty::Hard => 32,
        }
    }

    /// Dart bot accuracy
    pub fn bot_skill(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.45,
            Difficulty::Normal => BOT_DEFAULT_SKILL,
            Difficulty::Hard => 0.85,
        }
    }
}

/// Candy hearts level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub moves: u32,
    pub goals: Vec<Goal>,
    /// Relative refill weight per colour, in `HeartColor::ALL` order
    #[serde(default = "uniform_colors")]
    pub color_weights: [u32; HEART_COLOR_COUNT],
}

fn uniform_colors() -> [u32; HEART_COLOR_COUNT] {
    [1; HEART_COLOR_COUNT]
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            moves: MATCH_DEFAULT_MOVES,
            goals: vec![
                Goal {
                    color: HeartColor::Red,
                    target: 30,
                },
                Goal {
                    color: HeartColor::Blue,
                    target: 25,
                },
                Goal {
                    color: HeartColor::Pink,
                    target: 20,
                },
            ],
            color_weights: uniform_colors(),
        }
    }
}

/// Block puzzle level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSettings {
    pub moves: u32,
    pub target_lines: u32,
    /// Relative draw weight per catalog shape; `None` = uniform
    #[serde(default)]
    pub piece_weights: Option<Vec<u32>>,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            moves: PLACEMENT_DEFAULT_MOVES,
            target_lines: PLACEMENT_DEFAULT_TARGET_LINES,
            piece_weights: None,
        }
    }
}

/// Darts duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DartSettings {
    pub starting_score: u32,
    /// 0 = random, 1 = perfect
    pub bot_skill: f32,
    /// Jitter standard deviation in pixels at skill 0
    pub bot_jitter: f32,
}

impl Default for DartSettings {
    fn default() -> Self {
        Self {
            starting_score: DART_STARTING_SCORE,
            bot_skill: BOT_DEFAULT_SKILL,
            bot_jitter: BOT_DEFAULT_JITTER,
        }
    }
}

/// All game settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
    #[serde(default)]
    pub candy: MatchSettings,
    #[serde(default)]
    pub block_puzzle: PlacementSettings,
    #[serde(default)]
    pub darts: DartSettings,
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset (updates difficulty-dependent values)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;
        self.candy.moves = preset.match_moves();
        self.block_puzzle.moves = preset.placement_moves();
        self.darts.bot_skill = preset.bot_skill();
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        settings.validate()?;
        log::info!("loaded settings ({} difficulty)", settings.difficulty.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Catch configuration mistakes before a session starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candy.moves == 0 || self.block_puzzle.moves == 0 {
            return Err(ConfigError::ZeroMoves);
        }
        Goals::new(self.candy.goals.clone())?;
        if self.candy.color_weights.iter().all(|w| *w == 0) {
            return Err(ConfigError::InvalidWeights("all colour weights are zero".into()));
        }
        if self.block_puzzle.target_lines == 0 {
            return Err(ConfigError::ZeroLineTarget);
        }
        if self.darts.starting_score == 0 {
            return Err(ConfigError::ZeroStartingScore);
        }
        if !(0.0..=1.0).contains(&self.darts.bot_skill) {
            return Err(ConfigError::SkillOutOfRange(self.darts.bot_skill));
        }
        if !self.darts.bot_jitter.is_finite() || self.darts.bot_jitter < 0.0 {
            return Err(ConfigError::InvalidJitter(self.darts.bot_jitter));
        }
        Ok(())
    }
}
