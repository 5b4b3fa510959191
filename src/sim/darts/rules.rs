//! 501 double-out rules and the turn state machine
//!
//! Both sides start at the same score. A turn is up to three throws; a
//! throw that overshoots, or reaches zero without a double or bullseye,
//! busts the turn and restores the score held when the turn began. A valid
//! checkout ends the match immediately.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aim::power_throw;
use super::board::{BULLSEYE, BoardGeometry, Hit};
use super::bot::BotPolicy;
use crate::consts::DARTS_PER_TURN;
use crate::error::ConfigError;
use crate::rewards::LevelCode;
use crate::session::{GameEngine, Outcome};
use crate::settings::DartSettings;

/// Does this throw check out: exactly zero, on a double or the inner bull
pub fn can_finish(remaining: u32, throw_score: u32, multiplier: u8, sector: u8) -> bool {
    remaining == throw_score && (multiplier == 2 || sector == BULLSEYE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Bot,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Bot,
            Side::Bot => Side::Player,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Bot => 1,
        }
    }
}

/// A dart as thrown; the hit is always recomputed from the position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Throw {
    pub side: Side,
    pub position: Vec2,
    pub hit: Hit,
}

/// A finished turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub side: Side,
    pub throws: Vec<Throw>,
    /// Points committed; 0 on bust
    pub total: u32,
    pub bust: bool,
}

/// State after a throw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// Same side throws again; holds the index of the next throw (1 or 2)
    AwaitingThrow(u8),
    /// Turn voided, score restored, other side to throw
    Bust,
    /// Checkout, match over
    Finished(Side),
    /// Three darts thrown, score committed, other side to throw
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowRejection {
    MatchOver,
    /// Throw requested for the side that is not up
    NotYourTurn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowReport {
    pub throw: Throw,
    /// Thrower's score after this dart (restored value on bust)
    pub remaining: u32,
    pub state: TurnState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowOutcome {
    Rejected(ThrowRejection),
    Scored(ThrowReport),
}

/// One player-versus-bot 501 match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DartMatch {
    geometry: BoardGeometry,
    starting_score: u32,
    scores: [u32; 2],
    active: Side,
    /// Score the active side held when its turn began
    turn_start: u32,
    current: Vec<Throw>,
    history: Vec<Turn>,
    winner: Option<Side>,
    bot: BotPolicy,
    rng: Pcg32,
}

impl DartMatch {
    /// Player throws first
    pub fn new(settings: &DartSettings, seed: u64) -> Result<Self, ConfigError> {
        if settings.starting_score == 0 {
            return Err(ConfigError::ZeroStartingScore);
        }
        let bot = BotPolicy::new(settings.bot_skill, settings.bot_jitter)?;
        log::info!(
            "darts started (seed {}, {} to go, bot skill {:.2})",
            seed,
            settings.starting_score,
            settings.bot_skill
        );
        Ok(Self {
            geometry: BoardGeometry::default(),
            starting_score: settings.starting_score,
            scores: [settings.starting_score; 2],
            active: Side::Player,
            turn_start: settings.starting_score,
            current: Vec::with_capacity(DARTS_PER_TURN),
            history: Vec::new(),
            winner: None,
            bot,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn starting_score(&self) -> u32 {
        self.starting_score
    }

    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    pub fn active(&self) -> Side {
        self.active
    }

    /// Throws made so far in the turn in progress
    pub fn current_turn(&self) -> &[Throw] {
        &self.current
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn bot(&self) -> &BotPolicy {
        &self.bot
    }

    /// Throw for `side` landing at `position`
    pub fn throw_as(&mut self, side: Side, position: Vec2) -> ThrowOutcome {
        if self.winner.is_some() {
            return ThrowOutcome::Rejected(ThrowRejection::MatchOver);
        }
        if side != self.active {
            return ThrowOutcome::Rejected(ThrowRejection::NotYourTurn);
        }
        self.throw_at(position)
    }

    /// Throw for whichever side is up, landing at `position`
    pub fn throw_at(&mut self, position: Vec2) -> ThrowOutcome {
        if self.winner.is_some() {
            return ThrowOutcome::Rejected(ThrowRejection::MatchOver);
        }

        let side = self.active;
        let hit = self.geometry.score_from_point(position);
        let throw = Throw {
            side,
            position,
            hit,
        };
        self.current.push(throw);

        let remaining = self.scores[side.index()];
        let state = if hit.score > remaining
            || (hit.score == remaining
                && !can_finish(remaining, hit.score, hit.multiplier, hit.sector))
        {
            self.end_turn(true);
            TurnState::Bust
        } else if hit.score == remaining {
            self.scores[side.index()] = 0;
            self.winner = Some(side);
            self.end_turn(false);
            log::info!("{:?} checked out", side);
            TurnState::Finished(side)
        } else {
            self.scores[side.index()] = remaining - hit.score;
            if self.current.len() >= DARTS_PER_TURN {
                self.end_turn(false);
                TurnState::Complete
            } else {
                TurnState::AwaitingThrow(self.current.len() as u8)
            }
        };

        ThrowOutcome::Scored(ThrowReport {
            throw,
            remaining: self.scores[side.index()],
            state,
        })
    }

    /// Player throw through the power meter
    pub fn throw_with_power(&mut self, aim: Vec2, power: u8) -> ThrowOutcome {
        let landing = power_throw(aim, power, &mut self.rng);
        self.throw_as(Side::Player, landing)
    }

    /// Run the bot's whole turn; returns its throws in order
    pub fn play_bot_turn(&mut self) -> Vec<ThrowReport> {
        let mut reports = Vec::with_capacity(DARTS_PER_TURN);
        while self.active == Side::Bot && self.winner.is_none() {
            let landing = self
                .bot
                .throw(self.score(Side::Bot), &self.geometry, &mut self.rng);
            match self.throw_as(Side::Bot, landing) {
                ThrowOutcome::Scored(report) => {
                    reports.push(report);
                    if !matches!(report.state, TurnState::AwaitingThrow(_)) {
                        break;
                    }
                }
                ThrowOutcome::Rejected(_) => break,
            }
        }
        reports
    }

    fn end_turn(&mut self, bust: bool) {
        let side = self.active;
        let throws = std::mem::take(&mut self.current);
        let total = if bust {
            self.scores[side.index()] = self.turn_start;
            0
        } else {
            self.turn_start.saturating_sub(self.scores[side.index()])
        };
        log::debug!(
            "{:?} turn over: {} scored{}, {} left",
            side,
            total,
            if bust { " (bust)" } else { "" },
            self.scores[side.index()]
        );
        self.history.push(Turn {
            side,
            throws,
            total,
            bust,
        });

        if self.winner.is_none() {
            self.active = side.other();
            self.turn_start = self.scores[self.active.index()];
        }
    }
}

impl GameEngine for DartMatch {
    fn level(&self) -> LevelCode {
        LevelCode::Dart
    }

    fn outcome(&self) -> Outcome {
        match self.winner {
            None => Outcome::InProgress,
            Some(Side::Player) => Outcome::Won,
            Some(Side::Bot) => Outcome::Lost,
        }
    }

    /// Darts thrown by the player across the match
    fn completion_score(&self) -> Option<u32> {
        let darts = self
            .history
            .iter()
            .filter(|t| t.side == Side::Player)
            .map(|t| t.throws.len() as u32)
            .sum();
        Some(darts)
    }
}
