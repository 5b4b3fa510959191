//! Session controller shared by all three games
//!
//! Engines resolve their own board state synchronously. The session watches
//! the engine's outcome after each action and, on the single transition to
//! `Won`, reports the level to the rewards collaborator exactly once.

use serde::{Deserialize, Serialize};

use crate::error::{RewardsError, SessionError};
use crate::rewards::{Completion, LevelCode, LevelRewards};

/// Terminal condition of an engine after its latest committed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_over(self) -> bool {
        self != Outcome::InProgress
    }

    /// Win is checked before the exhausted budget, so a winning final move wins
    pub fn evaluate(goals_met: bool, budget: &MoveBudget) -> Self {
        if goals_met {
            Outcome::Won
        } else if budget.is_exhausted() {
            Outcome::Lost
        } else {
            Outcome::InProgress
        }
    }
}

/// Moves remaining in a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveBudget {
    limit: u32,
    remaining: u32,
}

impl MoveBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn used(&self) -> u32 {
        self.limit - self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Spend one move; returns false if none were left
    pub fn spend(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Anything a session can drive to completion
pub trait GameEngine {
    /// Level this engine is played for
    fn level(&self) -> LevelCode;
    /// Current terminal condition
    fn outcome(&self) -> Outcome;
    /// Score sent along with the completion, if the game has one
    fn completion_score(&self) -> Option<u32> {
        None
    }
}

/// Session lifecycle as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    Won,
    Lost,
}

/// State of the level-completion report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RewardStatus {
    /// No win yet
    #[default]
    NotDue,
    /// Collaborator confirmed the completion
    Awarded(Completion),
    /// Collaborator failed; the win stands and the report can be retried
    Failed(String),
}

/// One player's playthrough of one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session<G> {
    game: G,
    phase: SessionPhase,
    reward: RewardStatus,
}

impl<G: GameEngine> Session<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            phase: SessionPhase::Playing,
            reward: RewardStatus::NotDue,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Player actions go through the engine; call `settle` afterwards
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn reward(&self) -> &RewardStatus {
        &self.reward
    }

    /// Hearts granted by the collaborator, once the report succeeded
    pub fn hearts_awarded(&self) -> Option<u32> {
        match &self.reward {
            RewardStatus::Awarded(c) => Some(c.hearts_awarded),
            _ => None,
        }
    }

    /// Evaluate the engine's outcome and report a fresh win.
    ///
    /// Safe to call any number of times: only the `Playing -> Won` transition
    /// contacts the collaborator.
    pub async fn settle<R: LevelRewards>(
        &mut self,
        rewards: &mut R,
    ) -> Result<SessionPhase, SessionError> {
        if self.phase != SessionPhase::Playing {
            return Ok(self.phase);
        }

        match self.game.outcome() {
            Outcome::InProgress => Ok(self.phase),
            Outcome::Lost => {
                log::info!("{}: session lost", self.game.level());
                self.phase = SessionPhase::Lost;
                Ok(self.phase)
            }
            Outcome::Won => {
                log::info!("{}: session won", self.game.level());
                self.phase = SessionPhase::Won;
                self.report(rewards).await?;
                Ok(self.phase)
            }
        }
    }

    /// Retry a failed completion report
    pub async fn retry_reward<R: LevelRewards>(
        &mut self,
        rewards: &mut R,
    ) -> Result<Completion, SessionError> {
        if !matches!(self.reward, RewardStatus::Failed(_)) {
            return Err(SessionError::NothingToRetry);
        }
        self.report(rewards).await
    }

    async fn report<R: LevelRewards>(&mut self, rewards: &mut R) -> Result<Completion, SessionError> {
        let level = self.game.level();
        let result: Result<Completion, RewardsError> = rewards
            .complete_level(level, self.game.completion_score())
            .await;
        match result {
            Ok(completion) => {
                log::info!("{}: awarded {} hearts", level, completion.hearts_awarded);
                self.reward = RewardStatus::Awarded(completion.clone());
                Ok(completion)
            }
            Err(source) => {
                log::warn!("{}: completion report failed: {}", level, source);
                self.reward = RewardStatus::Failed(source.to_string());
                Err(SessionError::Rewards { level, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine stub whose outcome the test flips directly
    struct Scripted {
        outcome: Outcome,
    }

    impl GameEngine for Scripted {
        fn level(&self) -> LevelCode {
            LevelCode::Candy
        }

        fn outcome(&self) -> Outcome {
            self.outcome
        }

        fn completion_score(&self) -> Option<u32> {
            Some(7)
        }
    }

    /// Collaborator that counts calls and can be told to fail
    #[derive(Default)]
    struct CountingRewards {
        calls: u32,
        fail_next: bool,
        last_score: Option<u32>,
    }

    impl LevelRewards for CountingRewards {
        async fn complete_level(
            &mut self,
            _level: LevelCode,
            score: Option<u32>,
        ) -> Result<Completion, RewardsError> {
            self.calls += 1;
            self.last_score = score;
            if self.fail_next {
                self.fail_next = false;
                return Err(RewardsError::Unavailable("offline".into()));
            }
            Ok(Completion {
                completed: true,
                hearts_awarded: 10,
            })
        }

        async fn balance(&mut self) -> Result<u32, RewardsError> {
            Ok(0)
        }

        async fn add_currency(&mut self, amount: i64) -> Result<u32, RewardsError> {
            Ok(amount as u32)
        }
    }

    #[test]
    fn test_budget_spend() {
        let mut budget = MoveBudget::new(2);
        assert!(budget.spend());
        assert!(budget.spend());
        assert!(budget.is_exhausted());
        assert!(!budget.spend());
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_win_beats_exhausted_budget() {
        let mut budget = MoveBudget::new(1);
        budget.spend();
        assert_eq!(Outcome::evaluate(true, &budget), Outcome::Won);
        assert_eq!(Outcome::evaluate(false, &budget), Outcome::Lost);
        assert_eq!(
            Outcome::evaluate(false, &MoveBudget::new(3)),
            Outcome::InProgress
        );
    }

    #[tokio::test]
    async fn test_win_reported_exactly_once() {
        let mut session = Session::new(Scripted {
            outcome: Outcome::InProgress,
        });
        let mut rewards = CountingRewards::default();

        assert_eq!(session.settle(&mut rewards).await, Ok(SessionPhase::Playing));
        assert_eq!(rewards.calls, 0);

        session.game_mut().outcome = Outcome::Won;
        for _ in 0..3 {
            assert_eq!(session.settle(&mut rewards).await, Ok(SessionPhase::Won));
        }
        assert_eq!(rewards.calls, 1);
        assert_eq!(rewards.last_score, Some(7));
        assert_eq!(session.hearts_awarded(), Some(10));
    }

    #[tokio::test]
    async fn test_loss_never_contacts_collaborator() {
        let mut session = Session::new(Scripted {
            outcome: Outcome::Lost,
        });
        let mut rewards = CountingRewards::default();
        assert_eq!(session.settle(&mut rewards).await, Ok(SessionPhase::Lost));
        // A later win signal cannot revive a lost session
        session.game_mut().outcome = Outcome::Won;
        assert_eq!(session.settle(&mut rewards).await, Ok(SessionPhase::Lost));
        assert_eq!(rewards.calls, 0);
    }

    #[tokio::test]
    async fn test_failed_report_keeps_win_and_retries() {
        let mut session = Session::new(Scripted {
            outcome: Outcome::Won,
        });
        let mut rewards = CountingRewards {
            fail_next: true,
            ..Default::default()
        };

        let err = session.settle(&mut rewards).await.unwrap_err();
        assert!(matches!(err, SessionError::Rewards { .. }));
        assert_eq!(session.phase(), SessionPhase::Won);
        assert!(matches!(session.reward(), RewardStatus::Failed(_)));

        // Settling again does not re-report; retry is explicit
        assert_eq!(session.settle(&mut rewards).await, Ok(SessionPhase::Won));
        assert_eq!(rewards.calls, 1);

        let completion = session.retry_reward(&mut rewards).await.unwrap();
        assert_eq!(completion.hearts_awarded, 10);
        assert_eq!(rewards.calls, 2);
        assert_eq!(
            session.retry_reward(&mut rewards).await,
            Err(SessionError::NothingToRetry)
        );
    }
}
