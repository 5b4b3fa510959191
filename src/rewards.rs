//! Contract with the progression backend
//!
//! The engines never touch currency. A session reports a won level through
//! `LevelRewards::complete_level`; the collaborator decides how many hearts
//! that is worth and must treat repeat completions as a no-op.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{INTRO_HEARTS, LEVEL_COMPLETION_HEARTS};
use crate::error::RewardsError;

/// The three minigame levels, in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelCode {
    Candy,
    BlockPuzzle,
    Dart,
}

impl LevelCode {
    pub const ALL: [LevelCode; 3] = [LevelCode::Candy, LevelCode::BlockPuzzle, LevelCode::Dart];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelCode::Candy => "level_1_candy",
            LevelCode::BlockPuzzle => "level_2_block_puzzle",
            LevelCode::Dart => "level_3_dart",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        LevelCode::ALL.into_iter().find(|l| l.as_str() == s)
    }

    /// Position in the unlock order (1-based)
    pub fn order_index(&self) -> u32 {
        match self {
            LevelCode::Candy => 1,
            LevelCode::BlockPuzzle => 2,
            LevelCode::Dart => 3,
        }
    }

    /// Level that must be completed first, if any
    pub fn previous(&self) -> Option<LevelCode> {
        match self {
            LevelCode::Candy => None,
            LevelCode::BlockPuzzle => Some(LevelCode::Candy),
            LevelCode::Dart => Some(LevelCode::BlockPuzzle),
        }
    }
}

impl fmt::Display for LevelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborator answer to a completion report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub completed: bool,
    /// Zero when the level had already been completed
    pub hearts_awarded: u32,
}

/// External progression service (network-bound in the full app)
#[allow(async_fn_in_trait)]
pub trait LevelRewards {
    /// Mark a level completed; idempotent, repeat calls award nothing
    async fn complete_level(
        &mut self,
        level: LevelCode,
        score: Option<u32>,
    ) -> Result<Completion, RewardsError>;

    /// Current heart balance (display only)
    async fn balance(&mut self) -> Result<u32, RewardsError>;

    /// Add hearts and return the new balance
    async fn add_currency(&mut self, amount: i64) -> Result<u32, RewardsError>;
}

/// Progress on one level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub completed: bool,
    pub best_score: Option<u32>,
}

/// In-process ledger with the same semantics as the backend.
///
/// Used by the demo binary and tests, and as a local stand-in when the
/// backend is not reachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryRewards {
    balance: u32,
    total_earned: u32,
    levels_completed: u32,
    progress: BTreeMap<LevelCode, LevelProgress>,
}

impl InMemoryRewards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing balance
    pub fn with_balance(balance: u32) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    pub fn progress(&self, level: LevelCode) -> LevelProgress {
        self.progress.get(&level).cloned().unwrap_or_default()
    }

    pub fn is_completed(&self, level: LevelCode) -> bool {
        self.progress(level).completed
    }

    /// First level is always open; others need the previous one completed
    pub fn is_unlocked(&self, level: LevelCode) -> bool {
        level.previous().is_none_or(|prev| self.is_completed(prev))
    }

    pub fn total_earned(&self) -> u32 {
        self.total_earned
    }

    pub fn levels_completed(&self) -> u32 {
        self.levels_completed
    }

    pub fn current_balance(&self) -> u32 {
        self.balance
    }
}

impl LevelRewards for InMemoryRewards {
    async fn complete_level(
        &mut self,
        level: LevelCode,
        score: Option<u32>,
    ) -> Result<Completion, RewardsError> {
        let entry = self.progress.entry(level).or_default();
        if entry.completed {
            log::info!("{} already completed, no hearts awarded", level);
            return Ok(Completion {
                completed: true,
                hearts_awarded: 0,
            });
        }

        entry.completed = true;
        entry.best_score = score;
        self.balance += LEVEL_COMPLETION_HEARTS;
        self.total_earned += LEVEL_COMPLETION_HEARTS;
        self.levels_completed += 1;
        log::info!(
            "{} completed (score {:?}), balance now {}",
            level,
            score,
            self.balance
        );

        Ok(Completion {
            completed: true,
            hearts_awarded: LEVEL_COMPLETION_HEARTS,
        })
    }

    async fn balance(&mut self) -> Result<u32, RewardsError> {
        Ok(self.balance)
    }

    async fn add_currency(&mut self, amount: i64) -> Result<u32, RewardsError> {
        let add = u32::try_from(amount)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(RewardsError::InvalidAmount(amount))?;
        self.balance = self.balance.saturating_add(add);
        Ok(self.balance)
    }
}

/// Bring the balance up to the intro grant. Never takes hearts away.
///
/// Returns the balance after the top-up.
pub async fn top_up_intro_hearts<R: LevelRewards>(rewards: &mut R) -> Result<u32, RewardsError> {
    let balance = rewards.balance().await?;
    if balance >= INTRO_HEARTS {
        if balance > INTRO_HEARTS {
            log::warn!("balance {} already above intro grant", balance);
        }
        return Ok(balance);
    }
    rewards.add_currency(i64::from(INTRO_HEARTS - balance)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_completion_awards_hearts() {
        let mut rewards = InMemoryRewards::new();
        let c = rewards.complete_level(LevelCode::Candy, Some(12)).await.unwrap();
        assert_eq!(
            c,
            Completion {
                completed: true,
                hearts_awarded: 10
            }
        );
        assert_eq!(rewards.balance().await.unwrap(), 10);
        assert_eq!(rewards.progress(LevelCode::Candy).best_score, Some(12));
    }

    #[tokio::test]
    async fn test_repeat_completion_is_idempotent() {
        let mut rewards = InMemoryRewards::new();
        rewards.complete_level(LevelCode::Dart, None).await.unwrap();
        let again = rewards.complete_level(LevelCode::Dart, Some(3)).await.unwrap();
        assert!(again.completed);
        assert_eq!(again.hearts_awarded, 0);
        assert_eq!(rewards.current_balance(), 10);
        assert_eq!(rewards.levels_completed(), 1);
        // Best score is not overwritten by a repeat
        assert_eq!(rewards.progress(LevelCode::Dart).best_score, None);
    }

    #[tokio::test]
    async fn test_unlock_order() {
        let mut rewards = InMemoryRewards::new();
        assert!(rewards.is_unlocked(LevelCode::Candy));
        assert!(!rewards.is_unlocked(LevelCode::BlockPuzzle));
        rewards.complete_level(LevelCode::Candy, None).await.unwrap();
        assert!(rewards.is_unlocked(LevelCode::BlockPuzzle));
        assert!(!rewards.is_unlocked(LevelCode::Dart));
    }

    #[tokio::test]
    async fn test_add_currency_rejects_non_positive() {
        let mut rewards = InMemoryRewards::new();
        assert_eq!(
            rewards.add_currency(0).await,
            Err(RewardsError::InvalidAmount(0))
        );
        assert_eq!(
            rewards.add_currency(-5).await,
            Err(RewardsError::InvalidAmount(-5))
        );
        assert_eq!(rewards.add_currency(4).await, Ok(4));
    }

    #[tokio::test]
    async fn test_intro_top_up() {
        let mut rewards = InMemoryRewards::with_balance(12);
        assert_eq!(top_up_intro_hearts(&mut rewards).await, Ok(30));
        // Second call adds nothing
        assert_eq!(top_up_intro_hearts(&mut rewards).await, Ok(30));

        let mut rich = InMemoryRewards::with_balance(45);
        assert_eq!(top_up_intro_hearts(&mut rich).await, Ok(45));
    }

    #[test]
    fn test_level_codes_roundtrip() {
        for level in LevelCode::ALL {
            assert_eq!(LevelCode::from_str(level.as_str()), Some(level));
        }
        assert_eq!(LevelCode::from_str("level_9"), None);
    }
}
