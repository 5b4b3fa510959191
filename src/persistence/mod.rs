//! Save/resume for in-progress games
//!
//! A save is a versioned JSON envelope around one engine's complete state,
//! RNG included, so a resumed game continues exactly where it stopped.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::rewards::LevelCode;
use crate::session::GameEngine;
use crate::sim::{DartMatch, MatchGame, PlacementGame};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// One saved engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "level", content = "state")]
pub enum SavedGame {
    Candy(MatchGame),
    BlockPuzzle(PlacementGame),
    Dart(DartMatch),
}

impl SavedGame {
    pub fn level(&self) -> LevelCode {
        match self {
            SavedGame::Candy(g) => g.level(),
            SavedGame::BlockPuzzle(g) => g.level(),
            SavedGame::Dart(g) => g.level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub saved: SavedGame,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Serialize a game into a save envelope
pub fn save_json(saved: &SavedGame) -> Result<String, PersistenceError> {
    let envelope = SaveEnvelope {
        version: SAVE_VERSION,
        saved: saved.clone(),
    };
    let json = serde_json::to_string(&envelope)?;
    log::debug!("saved {} ({} bytes)", saved.level(), json.len());
    Ok(json)
}

/// Load a save, rejecting versions this build does not understand
pub fn load_json(json: &str) -> Result<SavedGame, PersistenceError> {
    let header: VersionHeader = serde_json::from_str(json)?;
    if header.version != SAVE_VERSION {
        log::warn!("refusing save version {}", header.version);
        return Err(PersistenceError::UnsupportedVersion {
            found: header.version,
            expected: SAVE_VERSION,
        });
    }
    let envelope: SaveEnvelope = serde_json::from_str(json)?;
    Ok(envelope.saved)
}
