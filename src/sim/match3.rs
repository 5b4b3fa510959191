//! Match-3 board with cascade resolution
//!
//! A committed swap runs the cascade loop to a fixpoint before returning:
//! find every run, clear, drop, refill, repeat. Each loop iteration is
//! recorded as a `Generation` so a presentation layer can animate it, but
//! the returned board is already settled.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::draw::WeightedCatalog;
use crate::consts::{HEART_COLOR_COUNT, MATCH_GRID_SIZE, MAX_CASCADE_GENERATIONS, MIN_RUN};
use crate::error::ConfigError;
use crate::rewards::LevelCode;
use crate::session::{GameEngine, MoveBudget, Outcome};
use crate::settings::MatchSettings;

/// Heart tile colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeartColor {
    Red,
    Blue,
    Yellow,
    Pink,
    Purple,
}

impl HeartColor {
    pub const ALL: [HeartColor; HEART_COLOR_COUNT] = [
        HeartColor::Red,
        HeartColor::Blue,
        HeartColor::Yellow,
        HeartColor::Pink,
        HeartColor::Purple,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-letter code used in board patterns
    pub fn as_char(self) -> char {
        match self {
            HeartColor::Red => 'R',
            HeartColor::Blue => 'B',
            HeartColor::Yellow => 'Y',
            HeartColor::Pink => 'P',
            HeartColor::Purple => 'U',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        HeartColor::ALL.into_iter().find(|h| h.as_char() == c)
    }
}

/// Grid coordinate (row 0 is the top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub row: usize,
    pub col: usize,
}

impl TilePos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        self.row < MATCH_GRID_SIZE && self.col < MATCH_GRID_SIZE
    }

    /// 4-directional neighbours only
    pub fn is_adjacent(self, other: TilePos) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// A tile; `color == None` means cleared and waiting for refill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Stable across gravity so the UI can track a heart as it falls
    pub id: u32,
    pub color: Option<HeartColor>,
}

impl Tile {
    const VACANT: Tile = Tile { id: 0, color: None };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

/// A maximal line of at least `MIN_RUN` same-coloured tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub color: HeartColor,
    pub axis: Axis,
    pub cells: Vec<TilePos>,
}

/// Per-colour tally of cleared tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCounts([u32; HEART_COLOR_COUNT]);

impl ColorCounts {
    pub fn get(&self, color: HeartColor) -> u32 {
        self.0[color.index()]
    }

    pub fn add(&mut self, color: HeartColor, n: u32) {
        self.0[color.index()] += n;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Collect `target` hearts of `color`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub color: HeartColor,
    pub target: u32,
}

/// Ordered goal list; every goal must be met to win
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Goal>")]
pub struct Goals(Vec<Goal>);

impl TryFrom<Vec<Goal>> for Goals {
    type Error = ConfigError;

    fn try_from(goals: Vec<Goal>) -> Result<Self, Self::Error> {
        Goals::new(goals)
    }
}

impl Goals {
    pub fn new(goals: Vec<Goal>) -> Result<Self, ConfigError> {
        if goals.is_empty() {
            return Err(ConfigError::NoGoals);
        }
        let mut seen = BTreeSet::new();
        for goal in &goals {
            if goal.target == 0 {
                return Err(ConfigError::ZeroGoalTarget(goal.color));
            }
            if !seen.insert(goal.color) {
                return Err(ConfigError::DuplicateGoal(goal.color));
            }
        }
        Ok(Self(goals))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.0.iter()
    }

    pub fn all_met(&self, collected: &ColorCounts) -> bool {
        self.0.iter().all(|g| collected.get(g.color) >= g.target)
    }
}

/// The 8x8 tile grid, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SavedBoard")]
pub struct Board {
    tiles: Vec<Tile>,
    next_id: u32,
}

#[derive(Deserialize)]
struct SavedBoard {
    tiles: Vec<Tile>,
    next_id: u32,
}

impl TryFrom<SavedBoard> for Board {
    type Error = ConfigError;

    fn try_from(saved: SavedBoard) -> Result<Self, Self::Error> {
        let expected = MATCH_GRID_SIZE * MATCH_GRID_SIZE;
        if saved.tiles.len() != expected {
            return Err(ConfigError::BoardPattern(format!(
                "expected {} tiles, got {}",
                expected,
                saved.tiles.len()
            )));
        }
        Ok(Self {
            tiles: saved.tiles,
            next_id: saved.next_id,
        })
    }
}

impl Board {
    /// Random board with no pre-existing runs
    pub fn random<R: Rng + ?Sized>(palette: &WeightedCatalog<HeartColor>, rng: &mut R) -> Self {
        let mut board = Self {
            tiles: vec![Tile::VACANT; MATCH_GRID_SIZE * MATCH_GRID_SIZE],
            next_id: 1,
        };
        board.refill(palette, rng);
        let rerolls = board.stabilise(palette, rng);
        log::debug!("initial board settled after {} rerolls", rerolls);
        board
    }

    /// Build a board from rows of colour letters (`R B Y P U`, `.` = empty)
    pub fn from_pattern(rows: &[&str]) -> Result<Self, ConfigError> {
        if rows.len() != MATCH_GRID_SIZE {
            return Err(ConfigError::BoardPattern(format!(
                "expected {} rows, got {}",
                MATCH_GRID_SIZE,
                rows.len()
            )));
        }
        let mut tiles = Vec::with_capacity(MATCH_GRID_SIZE * MATCH_GRID_SIZE);
        let mut next_id = 1;
        for (r, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != MATCH_GRID_SIZE {
                return Err(ConfigError::BoardPattern(format!(
                    "row {} has {} cells",
                    r,
                    chars.len()
                )));
            }
            for c in chars {
                let color = match c {
                    '.' => None,
                    _ => Some(HeartColor::from_char(c).ok_or_else(|| {
                        ConfigError::BoardPattern(format!("unknown colour '{}' in row {}", c, r))
                    })?),
                };
                tiles.push(Tile { id: next_id, color });
                next_id += 1;
            }
        }
        Ok(Self { tiles, next_id })
    }

    #[inline]
    fn idx(pos: TilePos) -> usize {
        pos.row * MATCH_GRID_SIZE + pos.col
    }

    pub fn tile(&self, pos: TilePos) -> Tile {
        self.tiles[Self::idx(pos)]
    }

    pub fn color(&self, pos: TilePos) -> Option<HeartColor> {
        self.tiles[Self::idx(pos)].color
    }

    /// Colours only, row-major (tile ids ignored)
    pub fn colors(&self) -> Vec<Option<HeartColor>> {
        self.tiles.iter().map(|t| t.color).collect()
    }

    /// Board as pattern rows, the inverse of `from_pattern`
    pub fn to_pattern(&self) -> Vec<String> {
        self.tiles
            .chunks(MATCH_GRID_SIZE)
            .map(|row| {
                row.iter()
                    .map(|t| t.color.map_or('.', HeartColor::as_char))
                    .collect()
            })
            .collect()
    }

    pub fn swap(&mut self, a: TilePos, b: TilePos) {
        self.tiles.swap(Self::idx(a), Self::idx(b));
    }

    /// Every maximal run, rows first then columns.
    ///
    /// Runs are collected before anything is cleared, so crossing L/T shapes
    /// report both arms.
    pub fn find_runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        for line in 0..MATCH_GRID_SIZE {
            self.scan_line(Axis::Row, line, &mut runs);
        }
        for line in 0..MATCH_GRID_SIZE {
            self.scan_line(Axis::Column, line, &mut runs);
        }
        runs
    }

    fn scan_line(&self, axis: Axis, line: usize, runs: &mut Vec<Run>) {
        let at = |i: usize| match axis {
            Axis::Row => TilePos::new(line, i),
            Axis::Column => TilePos::new(i, line),
        };

        let mut start = 0;
        while start < MATCH_GRID_SIZE {
            let Some(color) = self.color(at(start)) else {
                start += 1;
                continue;
            };
            let mut end = start + 1;
            while end < MATCH_GRID_SIZE && self.color(at(end)) == Some(color) {
                end += 1;
            }
            if end - start >= MIN_RUN {
                runs.push(Run {
                    color,
                    axis,
                    cells: (start..end).map(at).collect(),
                });
            }
            start = end;
        }
    }

    pub fn has_runs(&self) -> bool {
        !self.find_runs().is_empty()
    }

    /// Compact each column toward the bottom, keeping relative order
    pub fn apply_gravity(&mut self) {
        for col in 0..MATCH_GRID_SIZE {
            let mut write = MATCH_GRID_SIZE;
            for row in (0..MATCH_GRID_SIZE).rev() {
                let tile = self.tile(TilePos::new(row, col));
                if tile.color.is_some() {
                    write -= 1;
                    self.tiles[Self::idx(TilePos::new(write, col))] = tile;
                }
            }
            for row in 0..write {
                self.tiles[Self::idx(TilePos::new(row, col))] = Tile::VACANT;
            }
        }
    }

    /// Fill every empty cell with a fresh tile; returns how many were filled
    pub fn refill<R: Rng + ?Sized>(
        &mut self,
        palette: &WeightedCatalog<HeartColor>,
        rng: &mut R,
    ) -> usize {
        let mut filled = 0;
        for tile in self.tiles.iter_mut().filter(|t| t.color.is_none()) {
            *tile = Tile {
                id: self.next_id,
                color: Some(palette.draw(rng)),
            };
            self.next_id += 1;
            filled += 1;
        }
        filled
    }

    /// Re-roll tiles in runs until none remain; nothing is counted toward goals
    fn stabilise<R: Rng + ?Sized>(
        &mut self,
        palette: &WeightedCatalog<HeartColor>,
        rng: &mut R,
    ) -> usize {
        let mut rerolls = 0;
        loop {
            let matched = matched_positions(&self.find_runs());
            if matched.is_empty() {
                return rerolls;
            }
            for pos in matched {
                self.tiles[Self::idx(pos)].color = Some(palette.draw(rng));
                rerolls += 1;
            }
        }
    }
}

/// Union of all run cells; a tile shared by two runs appears once
pub fn matched_positions(runs: &[Run]) -> BTreeSet<TilePos> {
    runs.iter().flat_map(|r| r.cells.iter().copied()).collect()
}

/// One pass of the cascade loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub runs: Vec<Run>,
    /// Each cleared tile once, with the colour it had
    pub cleared: Vec<(TilePos, HeartColor)>,
    /// Board after gravity and refill
    pub board: Board,
}

/// Full result of a committed swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub generations: Vec<Generation>,
    /// The generation cap was hit and leftover runs were re-rolled
    pub stabilised: bool,
}

impl Resolution {
    pub fn cleared_count(&self) -> usize {
        self.generations.iter().map(|g| g.cleared.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRejection {
    OutOfBounds,
    NotAdjacent,
    EmptyTile,
    GameOver,
}

/// Result of `attempt_swap`
#[derive(Debug, Clone)]
pub enum SwapOutcome {
    /// Illegal input; nothing changed
    Rejected(SwapRejection),
    /// Legal swap without a match: reverted, no move spent (UI shakes)
    NoMatch,
    /// Move spent and the board settled
    Matched(Resolution),
}

/// One candy-hearts playthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchGame {
    board: Board,
    palette: WeightedCatalog<HeartColor>,
    goals: Goals,
    collected: ColorCounts,
    budget: MoveBudget,
    rng: Pcg32,
    outcome: Outcome,
}

impl MatchGame {
    /// New level with a random, run-free board
    pub fn new(settings: &MatchSettings, seed: u64) -> Result<Self, ConfigError> {
        let (palette, goals) = Self::validate(settings)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::random(&palette, &mut rng);
        log::info!("candy hearts started (seed {}, {} moves)", seed, settings.moves);
        Ok(Self::assemble(board, palette, goals, settings.moves, rng))
    }

    /// New level on a prepared board; the board must be full and run-free
    pub fn with_board(settings: &MatchSettings, board: Board, seed: u64) -> Result<Self, ConfigError> {
        let (palette, goals) = Self::validate(settings)?;
        if board.colors().iter().any(Option::is_none) {
            return Err(ConfigError::BoardPattern("board has empty cells".into()));
        }
        if board.has_runs() {
            return Err(ConfigError::BoardPattern("board already contains a run".into()));
        }
        let rng = Pcg32::seed_from_u64(seed);
        Ok(Self::assemble(board, palette, goals, settings.moves, rng))
    }

    fn validate(
        settings: &MatchSettings,
    ) -> Result<(WeightedCatalog<HeartColor>, Goals), ConfigError> {
        if settings.moves == 0 {
            return Err(ConfigError::ZeroMoves);
        }
        let goals = Goals::new(settings.goals.clone())?;
        let palette = WeightedCatalog::weighted(
            HeartColor::ALL
                .into_iter()
                .zip(settings.color_weights)
                .collect(),
        )?;
        Ok((palette, goals))
    }

    fn assemble(
        board: Board,
        palette: WeightedCatalog<HeartColor>,
        goals: Goals,
        moves: u32,
        rng: Pcg32,
    ) -> Self {
        Self {
            board,
            palette,
            goals,
            collected: ColorCounts::default(),
            budget: MoveBudget::new(moves),
            rng,
            outcome: Outcome::InProgress,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn collected(&self) -> &ColorCounts {
        &self.collected
    }

    pub fn moves_left(&self) -> u32 {
        self.budget.remaining()
    }

    pub fn budget(&self) -> &MoveBudget {
        &self.budget
    }

    /// Swap two adjacent tiles, committing only if a run results
    pub fn attempt_swap(&mut self, a: TilePos, b: TilePos) -> SwapOutcome {
        if self.outcome.is_over() {
            return SwapOutcome::Rejected(SwapRejection::GameOver);
        }
        if !a.in_bounds() || !b.in_bounds() {
            return SwapOutcome::Rejected(SwapRejection::OutOfBounds);
        }
        if !a.is_adjacent(b) {
            return SwapOutcome::Rejected(SwapRejection::NotAdjacent);
        }
        if self.board.color(a).is_none() || self.board.color(b).is_none() {
            return SwapOutcome::Rejected(SwapRejection::EmptyTile);
        }

        self.board.swap(a, b);
        if !self.board.has_runs() {
            self.board.swap(a, b);
            return SwapOutcome::NoMatch;
        }

        self.budget.spend();
        let resolution = self.resolve();
        self.outcome = Outcome::evaluate(self.goals.all_met(&self.collected), &self.budget);
        log::debug!(
            "swap {:?}<->{:?}: {} generations, {} cleared, {} moves left",
            a,
            b,
            resolution.generations.len(),
            resolution.cleared_count(),
            self.budget.remaining()
        );
        SwapOutcome::Matched(resolution)
    }

    /// Cascade loop: clear, drop, refill until no run remains
    fn resolve(&mut self) -> Resolution {
        let mut generations = Vec::new();
        let mut stabilised = false;

        loop {
            let runs = self.board.find_runs();
            if runs.is_empty() {
                break;
            }
            if generations.len() >= MAX_CASCADE_GENERATIONS {
                log::warn!("cascade hit {} generations, re-rolling leftovers", MAX_CASCADE_GENERATIONS);
                self.board.stabilise(&self.palette, &mut self.rng);
                stabilised = true;
                break;
            }

            let mut cleared = Vec::new();
            for pos in matched_positions(&runs) {
                if let Some(color) = self.board.color(pos) {
                    self.collected.add(color, 1);
                    cleared.push((pos, color));
                    self.board.tiles[Board::idx(pos)].color = None;
                }
            }

            self.board.apply_gravity();
            self.board.refill(&self.palette, &mut self.rng);
            generations.push(Generation {
                runs,
                cleared,
                board: self.board.clone(),
            });
        }

        Resolution {
            generations,
            stabilised,
        }
    }

    /// Every adjacent swap that would produce a run (right and down pairs)
    pub fn valid_swaps(&self) -> Vec<(TilePos, TilePos)> {
        let mut scratch = self.board.clone();
        let mut swaps = Vec::new();
        for row in 0..MATCH_GRID_SIZE {
            for col in 0..MATCH_GRID_SIZE {
                let a = TilePos::new(row, col);
                for b in [TilePos::new(row, col + 1), TilePos::new(row + 1, col)] {
                    if !b.in_bounds() {
                        continue;
                    }
                    scratch.swap(a, b);
                    if scratch.has_runs() {
                        swaps.push((a, b));
                    }
                    scratch.swap(a, b);
                }
            }
        }
        swaps
    }
}

impl GameEngine for MatchGame {
    fn level(&self) -> LevelCode {
        LevelCode::Candy
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Moves left at the win
    fn completion_score(&self) -> Option<u32> {
        Some(self.budget.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Row 0 holds `U U Y`; swapping (0,2) with (1,2) completes a purple row
    const PURPLE_ROW: [&str; 8] = [
        "UUYPURBY", "YPURBYPU", "URBYPURB", "BYPURBYP", "PURBYPUR", "RBYPURBY", "YPURBYPU",
        "URBYPURB",
    ];

    /// Swapping (3,2) with (4,2) clears `R R R` in row 3; column 0 then drops
    /// a blue onto two blues, so a second generation is guaranteed
    const CASCADE: [&str; 8] = [
        "RBYPURBY", "YPURBYPU", "BRBYPURB", "RRPURBYP", "BURBYPUR", "BBYPURBY", "YPURBYPU",
        "URBYPURB",
    ];

    fn settings(moves: u32, goals: Vec<Goal>) -> MatchSettings {
        MatchSettings {
            moves,
            goals,
            ..MatchSettings::default()
        }
    }

    fn game_on(pattern: &[&str], moves: u32, goals: Vec<Goal>) -> MatchGame {
        let board = Board::from_pattern(pattern).unwrap();
        MatchGame::with_board(&settings(moves, goals), board, 11).unwrap()
    }

    fn far_goal() -> Vec<Goal> {
        vec![Goal {
            color: HeartColor::Red,
            target: 10_000,
        }]
    }

    #[test]
    fn test_pattern_roundtrip() {
        let board = Board::from_pattern(&PURPLE_ROW).unwrap();
        assert_eq!(board.to_pattern(), PURPLE_ROW.to_vec());
        assert!(!board.has_runs());
    }

    #[test]
    fn test_runs_found_in_rows_and_columns() {
        // L shape: row 0 cols 0..3 and column 0 rows 0..3, sharing (0,0)
        let board = Board::from_pattern(&[
            "RRRBYPUB", "RBYPUBYP", "RYPUBYPU", "BPUBYPUB", "YUBYPUBY", "PBYPUBYP", "UYPUBYPU",
            "BPUBYPUB",
        ])
        .unwrap();
        let runs = board.find_runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].axis, Axis::Row);
        assert_eq!(runs[1].axis, Axis::Column);
        // Corner tile counted once
        assert_eq!(matched_positions(&runs).len(), 5);
    }

    #[test]
    fn test_gravity_keeps_order_and_ids() {
        let mut board = Board::from_pattern(&CASCADE).unwrap();
        let top = board.tile(TilePos::new(0, 0));
        let below = board.tile(TilePos::new(1, 0));
        board.tiles[Board::idx(TilePos::new(3, 0))].color = None;
        board.apply_gravity();
        assert_eq!(board.color(TilePos::new(0, 0)), None);
        assert_eq!(board.tile(TilePos::new(1, 0)), top);
        assert_eq!(board.tile(TilePos::new(2, 0)), below);
    }

    #[test]
    fn test_non_matching_swap_reverts() {
        let mut game = game_on(&PURPLE_ROW, 25, far_goal());
        let before = game.board().clone();
        let outcome = game.attempt_swap(TilePos::new(7, 6), TilePos::new(7, 7));
        assert!(matches!(outcome, SwapOutcome::NoMatch));
        assert_eq!(game.board(), &before);
        assert_eq!(game.moves_left(), 25);
        assert_eq!(game.collected().total(), 0);
    }

    #[test]
    fn test_illegal_swaps_rejected() {
        let mut game = game_on(&PURPLE_ROW, 25, far_goal());
        assert!(matches!(
            game.attempt_swap(TilePos::new(0, 0), TilePos::new(1, 1)),
            SwapOutcome::Rejected(SwapRejection::NotAdjacent)
        ));
        assert!(matches!(
            game.attempt_swap(TilePos::new(0, 7), TilePos::new(0, 8)),
            SwapOutcome::Rejected(SwapRejection::OutOfBounds)
        ));
        assert_eq!(game.moves_left(), 25);
    }

    #[test]
    fn test_matching_swap_spends_move_and_collects() {
        let mut game = game_on(&PURPLE_ROW, 25, far_goal());
        let outcome = game.attempt_swap(TilePos::new(0, 2), TilePos::new(1, 2));
        let SwapOutcome::Matched(resolution) = outcome else {
            panic!("expected a match, got {:?}", outcome);
        };
        assert_eq!(game.moves_left(), 24);
        assert!(game.collected().get(HeartColor::Purple) >= 3);
        let first = &resolution.generations[0];
        assert_eq!(
            first.cleared,
            vec![
                (TilePos::new(0, 0), HeartColor::Purple),
                (TilePos::new(0, 1), HeartColor::Purple),
                (TilePos::new(0, 2), HeartColor::Purple),
            ]
        );
        assert!(!game.board().has_runs());
        assert_eq!(game.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_gravity_cascade_gives_second_generation() {
        let mut game = game_on(&CASCADE, 25, far_goal());
        let SwapOutcome::Matched(resolution) =
            game.attempt_swap(TilePos::new(3, 2), TilePos::new(4, 2))
        else {
            panic!("expected a match");
        };

        // Seed 11's refills settle after the blue column clears
        assert_eq!(resolution.generations.len(), 2);
        assert!(!resolution.stabilised);
        let first = &resolution.generations[0];
        assert_eq!(first.runs.len(), 1);
        assert_eq!(first.runs[0].color, HeartColor::Red);

        let second = &resolution.generations[1];
        let blue_column = second
            .runs
            .iter()
            .find(|r| r.color == HeartColor::Blue && r.axis == Axis::Column)
            .expect("dropped blue forms a column run");
        for row in 3..=5 {
            assert!(blue_column.cells.contains(&TilePos::new(row, 0)));
        }
        assert_eq!(second.runs.len(), 1);
        assert_eq!(game.collected().get(HeartColor::Red), 3);
        assert_eq!(game.collected().get(HeartColor::Blue), 3);
        assert_eq!(game.collected().total(), 6);
        assert!(!game.board().has_runs());
    }

    #[test]
    fn test_loaded_board_must_be_full_size() {
        let board = Board::from_pattern(&PURPLE_ROW).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["tiles"].as_array_mut().unwrap().truncate(10);
        assert!(serde_json::from_value::<Board>(value).is_err());
    }

    #[test]
    fn test_loaded_goals_are_validated() {
        let dupes = r#"[{"color":"Red","target":3},{"color":"Red","target":4}]"#;
        assert!(serde_json::from_str::<Goals>(dupes).is_err());
        assert!(serde_json::from_str::<Goals>("[]").is_err());
    }

    #[test]
    fn test_same_seed_same_cascade() {
        let mut a = game_on(&CASCADE, 25, far_goal());
        let mut b = game_on(&CASCADE, 25, far_goal());
        a.attempt_swap(TilePos::new(3, 2), TilePos::new(4, 2));
        b.attempt_swap(TilePos::new(3, 2), TilePos::new(4, 2));
        assert_eq!(a.board(), b.board());
        assert_eq!(a.collected(), b.collected());
    }

    #[test]
    fn test_win_on_last_move_beats_loss() {
        let goals = vec![Goal {
            color: HeartColor::Purple,
            target: 3,
        }];
        let mut game = game_on(&PURPLE_ROW, 1, goals);
        game.attempt_swap(TilePos::new(0, 2), TilePos::new(1, 2));
        assert_eq!(game.moves_left(), 0);
        assert_eq!(game.outcome(), Outcome::Won);
        assert_eq!(game.completion_score(), Some(0));
    }

    #[test]
    fn test_loss_when_moves_run_out() {
        let mut game = game_on(&PURPLE_ROW, 1, far_goal());
        game.attempt_swap(TilePos::new(0, 2), TilePos::new(1, 2));
        assert_eq!(game.outcome(), Outcome::Lost);
        assert!(matches!(
            game.attempt_swap(TilePos::new(7, 6), TilePos::new(7, 7)),
            SwapOutcome::Rejected(SwapRejection::GameOver)
        ));
    }

    #[test]
    fn test_valid_swaps_contains_known_move() {
        let game = game_on(&PURPLE_ROW, 25, far_goal());
        let swaps = game.valid_swaps();
        assert!(swaps.contains(&(TilePos::new(0, 2), TilePos::new(1, 2))));
        assert!(!swaps.contains(&(TilePos::new(7, 6), TilePos::new(7, 7))));
    }

    #[test]
    fn test_duplicate_goal_fails_fast() {
        let goals = vec![
            Goal {
                color: HeartColor::Red,
                target: 3,
            },
            Goal {
                color: HeartColor::Red,
                target: 5,
            },
        ];
        let err = MatchGame::new(&settings(10, goals), 1).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateGoal(HeartColor::Red));
    }

    #[test]
    fn test_prepared_board_with_run_rejected() {
        let mut rows = PURPLE_ROW;
        rows[0] = "UUUPURBY";
        let board = Board::from_pattern(&rows).unwrap();
        assert!(MatchGame::with_board(&MatchSettings::default(), board, 1).is_err());
    }

    proptest! {
        #[test]
        fn prop_new_board_has_no_runs(seed in any::<u64>()) {
            let game = MatchGame::new(&MatchSettings::default(), seed).unwrap();
            prop_assert!(!game.board().has_runs());
            prop_assert!(game.board().colors().iter().all(Option::is_some));
        }

        #[test]
        fn prop_swap_commits_or_reverts(
            seed in any::<u64>(),
            row in 0..MATCH_GRID_SIZE,
            col in 0..MATCH_GRID_SIZE - 1,
            vertical in any::<bool>(),
        ) {
            let (a, b) = if vertical {
                (TilePos::new(col, row), TilePos::new(col + 1, row))
            } else {
                (TilePos::new(row, col), TilePos::new(row, col + 1))
            };
            let mut game = MatchGame::new(&MatchSettings::default(), seed).unwrap();
            let before = game.board().clone();
            let moves = game.moves_left();
            let collected = game.collected().total();

            match game.attempt_swap(a, b) {
                SwapOutcome::NoMatch => {
                    prop_assert_eq!(game.board(), &before);
                    prop_assert_eq!(game.moves_left(), moves);
                }
                SwapOutcome::Matched(resolution) => {
                    prop_assert_eq!(game.moves_left(), moves - 1);
                    prop_assert!(game.collected().total() > collected);
                    prop_assert!(!resolution.generations.is_empty());
                    prop_assert!(!game.board().has_runs());
                }
                SwapOutcome::Rejected(r) => prop_assert!(false, "unexpected rejection {:?}", r),
            }
        }
    }
}
