//! Block puzzle: place pieces on a 10x10 board, full lines clear
//!
//! Full rows and full columns are detected on the same post-placement board
//! and cleared together, so a placement finishing a row and a column at
//! once scores two lines.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::draw::WeightedCatalog;
use crate::consts::{HAND_SIZE, PLACEMENT_BOARD_SIZE};
use crate::error::ConfigError;
use crate::rewards::LevelCode;
use crate::session::{GameEngine, MoveBudget, Outcome};
use crate::settings::PlacementSettings;

const N: usize = PLACEMENT_BOARD_SIZE;

/// A piece shape as a boolean matrix (row-major, row 0 on top)
///
/// Saved pieces go back through the same shape checks when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PieceShape")]
pub struct Piece {
    shape: Vec<Vec<bool>>,
}

#[derive(Deserialize)]
struct PieceShape {
    shape: Vec<Vec<bool>>,
}

impl TryFrom<PieceShape> for Piece {
    type Error = ConfigError;

    fn try_from(raw: PieceShape) -> Result<Self, Self::Error> {
        Piece::from_shape(raw.shape)
    }
}

impl Piece {
    /// Build from a 0/1 matrix, rejecting malformed shapes
    pub fn from_matrix(rows: &[&[u8]]) -> Result<Self, ConfigError> {
        Self::from_shape(
            rows.iter()
                .map(|r| r.iter().map(|c| *c != 0).collect())
                .collect(),
        )
    }

    fn from_shape(shape: Vec<Vec<bool>>) -> Result<Self, ConfigError> {
        let cols = shape.first().map_or(0, Vec::len);
        if shape.is_empty() || cols == 0 {
            return Err(ConfigError::EmptyShape);
        }
        if shape.iter().any(|r| r.len() != cols) {
            return Err(ConfigError::RaggedShape);
        }
        if shape.len() > N || cols > N {
            return Err(ConfigError::OversizedShape {
                rows: shape.len(),
                cols,
            });
        }
        if !shape.iter().flatten().any(|c| *c) {
            return Err(ConfigError::HollowShape);
        }
        Ok(Self { shape })
    }

    pub fn rows(&self) -> usize {
        self.shape.len()
    }

    pub fn cols(&self) -> usize {
        self.shape.first().map_or(0, Vec::len)
    }

    /// Offsets of filled sub-cells
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shape.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(c, _)| (r, c))
        })
    }

    pub fn size(&self) -> usize {
        self.cells().count()
    }
}

/// The shipped shape set: singles, lines, L, Z, T and square variants
pub fn standard_pieces() -> Result<Vec<Piece>, ConfigError> {
    const SHAPES: [&[&[u8]]; 15] = [
        &[&[1]],
        &[&[1, 1]],
        &[&[1], &[1]],
        &[&[1, 1, 1]],
        &[&[1], &[1], &[1]],
        &[&[1, 1], &[1, 0]],
        &[&[1, 1], &[0, 1]],
        &[&[1, 1, 1, 1]],
        &[&[1], &[1], &[1], &[1]],
        &[&[1, 1], &[1, 1]],
        &[&[1, 1, 1], &[1, 0, 0]],
        &[&[1, 1, 1], &[0, 0, 1]],
        &[&[1, 1, 0], &[0, 1, 1]],
        &[&[0, 1, 1], &[1, 1, 0]],
        &[&[1, 1, 1], &[0, 1, 0]],
    ];
    SHAPES.iter().map(|s| Piece::from_matrix(s)).collect()
}

/// 10x10 occupancy grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBoard {
    cells: [[bool; N]; N],
}

impl PlacementBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows of `#` (filled) and `.` (empty)
    pub fn from_pattern(rows: &[&str]) -> Result<Self, ConfigError> {
        if rows.len() != N {
            return Err(ConfigError::BoardPattern(format!("expected {} rows, got {}", N, rows.len())));
        }
        let mut board = Self::new();
        for (r, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != N {
                return Err(ConfigError::BoardPattern(format!("row {} has {} cells", r, chars.len())));
            }
            for (c, ch) in chars.into_iter().enumerate() {
                board.cells[r][c] = match ch {
                    '#' => true,
                    '.' => false,
                    other => {
                        return Err(ConfigError::BoardPattern(format!(
                            "unknown cell '{}' in row {}",
                            other, r
                        )));
                    }
                };
            }
        }
        Ok(board)
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.cells[row][col]
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    fn full_rows(&self) -> Vec<usize> {
        (0..N).filter(|r| self.cells[*r].iter().all(|c| *c)).collect()
    }

    fn full_cols(&self) -> Vec<usize> {
        (0..N).filter(|c| (0..N).all(|r| self.cells[r][*c])).collect()
    }

    /// Does the piece fit inside the board on empty cells at this origin
    pub fn can_place(&self, piece: &Piece, row: isize, col: isize) -> bool {
        self.check(piece, row, col).is_ok()
    }

    fn check(&self, piece: &Piece, row: isize, col: isize) -> Result<(), PlaceRejection> {
        if row < 0 || col < 0 {
            return Err(PlaceRejection::OutOfBounds);
        }
        let (row, col) = (row as usize, col as usize);
        if row + piece.rows() > N || col + piece.cols() > N {
            return Err(PlaceRejection::OutOfBounds);
        }
        if piece.cells().any(|(r, c)| self.cells[row + r][col + c]) {
            return Err(PlaceRejection::Occupied);
        }
        Ok(())
    }

    /// Caller has already checked the placement
    fn stamp(&mut self, piece: &Piece, row: usize, col: usize) {
        for (r, c) in piece.cells() {
            self.cells[row + r][col + c] = true;
        }
    }

    /// Clear every full row and column; both sets are found before clearing
    fn clear_lines(&mut self) -> (Vec<usize>, Vec<usize>) {
        let rows = self.full_rows();
        let cols = self.full_cols();
        for r in &rows {
            self.cells[*r] = [false; N];
        }
        for c in &cols {
            for r in 0..N {
                self.cells[r][*c] = false;
            }
        }
        (rows, cols)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceRejection {
    NoSuchPiece,
    OutOfBounds,
    Occupied,
    GameOver,
}

/// What a successful placement did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceReport {
    pub rows_cleared: Vec<usize>,
    pub cols_cleared: Vec<usize>,
    /// A fresh hand was dealt because this piece was the last one
    pub hand_refilled: bool,
}

impl PlaceReport {
    pub fn lines(&self) -> u32 {
        (self.rows_cleared.len() + self.cols_cleared.len()) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Nothing changed
    Rejected(PlaceRejection),
    Placed(PlaceReport),
}

/// One block puzzle playthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementGame {
    board: PlacementBoard,
    hand: Vec<Piece>,
    catalog: WeightedCatalog<Piece>,
    budget: MoveBudget,
    lines_cleared: u32,
    target_lines: u32,
    rng: Pcg32,
    outcome: Outcome,
}

impl PlacementGame {
    /// Empty board and a freshly dealt hand
    pub fn new(settings: &PlacementSettings, seed: u64) -> Result<Self, ConfigError> {
        if settings.moves == 0 {
            return Err(ConfigError::ZeroMoves);
        }
        if settings.target_lines == 0 {
            return Err(ConfigError::ZeroLineTarget);
        }
        let pieces = standard_pieces()?;
        let catalog = match &settings.piece_weights {
            None => WeightedCatalog::uniform(pieces)?,
            Some(weights) if weights.len() == pieces.len() => {
                WeightedCatalog::weighted(pieces.into_iter().zip(weights.iter().copied()).collect())?
            }
            Some(weights) => {
                return Err(ConfigError::InvalidWeights(format!(
                    "{} weights for {} shapes",
                    weights.len(),
                    pieces.len()
                )));
            }
        };

        let mut game = Self {
            board: PlacementBoard::new(),
            hand: Vec::with_capacity(HAND_SIZE),
            catalog,
            budget: MoveBudget::new(settings.moves),
            lines_cleared: 0,
            target_lines: settings.target_lines,
            rng: Pcg32::seed_from_u64(seed),
            outcome: Outcome::InProgress,
        };
        game.deal();
        log::info!(
            "block puzzle started (seed {}, {} moves, {} lines to clear)",
            seed,
            settings.moves,
            settings.target_lines
        );
        Ok(game)
    }

    /// Replace the dealt hand (scripted levels and tutorials)
    pub fn with_hand(mut self, hand: Vec<Piece>) -> Result<Self, ConfigError> {
        if hand.is_empty() || hand.len() > HAND_SIZE {
            return Err(ConfigError::InvalidHand {
                got: hand.len(),
                max: HAND_SIZE,
            });
        }
        self.hand = hand;
        Ok(self)
    }

    /// Start from a prepared board; it must not hold any full line
    pub fn with_board(mut self, board: PlacementBoard) -> Result<Self, ConfigError> {
        if !board.full_rows().is_empty() || !board.full_cols().is_empty() {
            return Err(ConfigError::BoardPattern("board has a full line".into()));
        }
        self.board = board;
        Ok(self)
    }

    fn deal(&mut self) {
        self.hand.clear();
        for _ in 0..HAND_SIZE {
            let piece = self.catalog.draw(&mut self.rng);
            self.hand.push(piece);
        }
    }

    pub fn board(&self) -> &PlacementBoard {
        &self.board
    }

    pub fn hand(&self) -> &[Piece] {
        &self.hand
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn target_lines(&self) -> u32 {
        self.target_lines
    }

    pub fn moves_left(&self) -> u32 {
        self.budget.remaining()
    }

    /// Can hand piece `index` go at this origin
    pub fn can_place(&self, index: usize, row: isize, col: isize) -> bool {
        self.hand
            .get(index)
            .is_some_and(|p| self.board.can_place(p, row, col))
    }

    /// Place hand piece `index` with its top-left at (row, col)
    pub fn place(&mut self, index: usize, row: isize, col: isize) -> PlaceOutcome {
        if self.outcome.is_over() {
            return PlaceOutcome::Rejected(PlaceRejection::GameOver);
        }
        let Some(piece) = self.hand.get(index) else {
            return PlaceOutcome::Rejected(PlaceRejection::NoSuchPiece);
        };
        if let Err(rejection) = self.board.check(piece, row, col) {
            return PlaceOutcome::Rejected(rejection);
        }

        let piece = self.hand.remove(index);
        self.board.stamp(&piece, row as usize, col as usize);
        let (rows_cleared, cols_cleared) = self.board.clear_lines();
        self.budget.spend();

        let hand_refilled = self.hand.is_empty();
        if hand_refilled {
            self.deal();
        }

        let report = PlaceReport {
            rows_cleared,
            cols_cleared,
            hand_refilled,
        };
        self.lines_cleared += report.lines();
        if report.lines() > 0 {
            log::debug!(
                "cleared rows {:?} cols {:?} ({} / {})",
                report.rows_cleared,
                report.cols_cleared,
                self.lines_cleared,
                self.target_lines
            );
        }

        self.outcome = Outcome::evaluate(self.lines_cleared >= self.target_lines, &self.budget);
        PlaceOutcome::Placed(report)
    }

    /// Every origin where hand piece `index` fits
    pub fn legal_placements(&self, index: usize) -> Vec<(isize, isize)> {
        let Some(piece) = self.hand.get(index) else {
            return Vec::new();
        };
        let mut spots = Vec::new();
        for row in 0..N as isize {
            for col in 0..N as isize {
                if self.board.can_place(piece, row, col) {
                    spots.push((row, col));
                }
            }
        }
        spots
    }

    /// True if no piece in hand fits anywhere
    pub fn is_stuck(&self) -> bool {
        (0..self.hand.len()).all(|i| self.legal_placements(i).is_empty())
    }
}

impl GameEngine for PlacementGame {
    fn level(&self) -> LevelCode {
        LevelCode::BlockPuzzle
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }
}
