//! Bot opponent aiming policy

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::board::{BoardGeometry, Ring};
use crate::error::ConfigError;

/// Sectors the bot goes for when not checking out
pub const SCORING_SECTORS: [u8; 5] = [20, 19, 18, 17, 16];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotPolicy {
    /// 0 = random, 1 = perfect
    skill: f32,
    /// Jitter standard deviation in pixels at skill 0
    jitter: f32,
}

impl BotPolicy {
    pub fn new(skill: f32, jitter: f32) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&skill) {
            return Err(ConfigError::SkillOutOfRange(skill));
        }
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(ConfigError::InvalidJitter(jitter));
        }
        Ok(Self { skill, jitter })
    }

    pub fn skill(&self) -> f32 {
        self.skill
    }

    /// Jitter standard deviation after skill scaling
    pub fn spread(&self) -> f32 {
        self.jitter * (1.0 - self.skill)
    }

    /// Intended landing point for the bot's next dart
    pub fn aim<R: Rng + ?Sized>(&self, score: u32, board: &BoardGeometry, rng: &mut R) -> Vec2 {
        if score == 50 {
            return board.bullseye();
        }
        if score <= 40 && score % 2 == 0 && score > 0 {
            if let Some(target) = board.target((score / 2) as u8, Ring::Double) {
                return target;
            }
        }
        let sector = *SCORING_SECTORS.choose(rng).unwrap_or(&20);
        board
            .target(sector, Ring::Triple)
            .unwrap_or_else(|| board.bullseye())
    }

    /// Aim, then scatter the landing point by the skill-scaled jitter
    pub fn throw<R: Rng + ?Sized>(&self, score: u32, board: &BoardGeometry, rng: &mut R) -> Vec2 {
        let target = self.aim(score, board, rng);
        match Normal::new(0.0, self.spread()) {
            Ok(normal) if self.spread() > 0.0 => {
                target + Vec2::new(normal.sample(rng), normal.sample(rng))
            }
            _ => target,
        }
    }
}
