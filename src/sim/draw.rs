//! Seedable weighted draws over fixed catalogs
//!
//! Tile colours and puzzle pieces both come from small enumerated catalogs.
//! Draws go through a prebuilt `WeightedIndex` so the same seed always
//! yields the same sequence.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A fixed catalog of entries with relative draw weights
///
/// Only entries and weights are saved; loading rebuilds and revalidates the
/// index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "SavedCatalog<T>",
    bound(deserialize = "T: Deserialize<'de> + Clone")
)]
pub struct WeightedCatalog<T> {
    entries: Vec<T>,
    weights: Vec<u32>,
    #[serde(skip_serializing)]
    index: WeightedIndex<u32>,
}

#[derive(Deserialize)]
struct SavedCatalog<T> {
    entries: Vec<T>,
    weights: Vec<u32>,
}

impl<T: Clone> TryFrom<SavedCatalog<T>> for WeightedCatalog<T> {
    type Error = ConfigError;

    fn try_from(saved: SavedCatalog<T>) -> Result<Self, Self::Error> {
        if saved.entries.len() != saved.weights.len() {
            return Err(ConfigError::InvalidWeights(format!(
                "{} weights for {} entries",
                saved.weights.len(),
                saved.entries.len()
            )));
        }
        Self::weighted(saved.entries.into_iter().zip(saved.weights).collect())
    }
}

impl<T: Clone> WeightedCatalog<T> {
    /// Every entry equally likely
    pub fn uniform(entries: Vec<T>) -> Result<Self, ConfigError> {
        let weights = vec![1; entries.len()];
        Self::weighted(entries.into_iter().zip(weights).collect())
    }

    /// Entries paired with relative weights (zero weight = never drawn)
    pub fn weighted(pairs: Vec<(T, u32)>) -> Result<Self, ConfigError> {
        if pairs.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let (entries, weights): (Vec<T>, Vec<u32>) = pairs.into_iter().unzip();
        let index = WeightedIndex::new(&weights)
            .map_err(|e| ConfigError::InvalidWeights(e.to_string()))?;
        Ok(Self {
            entries,
            weights,
            index,
        })
    }

    /// Draw one entry
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.entries[self.index.sample(rng)].clone()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
