//! Deterministic game engines
//!
//! Each engine is a plain owned value driven by discrete moves:
//! - Seeded RNG only (same seed and moves, same game)
//! - Stable scan order (rows, then columns)
//! - Cascades and line clears resolve fully before a move returns
//! - No rendering, timing or network dependencies

pub mod darts;
pub mod draw;
pub mod match3;
pub mod placement;

pub use darts::{DartMatch, Side, ThrowOutcome, TurnState};
pub use draw::WeightedCatalog;
pub use match3::{Board, HeartColor, MatchGame, SwapOutcome, SwapRejection, TilePos};
pub use placement::{PlaceOutcome, PlaceRejection, PlacementBoard, PlacementGame, Piece};
