//! Compatibility index
//!
//! In-memory symmetric lookup of pairwise species affinity in [-1, 1].
//! Entries load once into a two-level `species1 → species2 → score` map and
//! the index is immutable afterwards, so it can be shared across requests.
//! Lookups never fail: a missing pair is neutral (0).

use rustc_hash::FxHashMap;

use crate::domain::CompatibilityEntry;
use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct CompatibilityIndex {
    scores: FxHashMap<String, FxHashMap<String, f64>>,
}

impl CompatibilityIndex {
    /// Builds the index from loaded entries. At most one entry per ordered
    /// pair; scores outside [-1, 1] are a data defect.
    pub fn from_entries(entries: &[CompatibilityEntry]) -> Result<Self, EngineError> {
        let mut scores: FxHashMap<String, FxHashMap<String, f64>> = FxHashMap::default();

        for entry in entries {
            if !(-1.0..=1.0).contains(&entry.score) {
                return Err(EngineError::catalogue(format!(
                    "compatibility score {} for ({}, {}) outside [-1, 1]",
                    entry.score, entry.species1, entry.species2
                )));
            }

            let inner = scores.entry(entry.species1.clone()).or_default();
            if inner.insert(entry.species2.clone(), entry.score).is_some() {
                return Err(EngineError::catalogue(format!(
                    "duplicate compatibility entry for ({}, {})",
                    entry.species1, entry.species2
                )));
            }
        }

        Ok(Self { scores })
    }

    /// Affinity between two species, checked in both directions; 0 when the
    /// pair was never recorded.
    pub fn lookup(&self, a: &str, b: &str) -> f64 {
        if let Some(score) = self.scores.get(a).and_then(|inner| inner.get(b)) {
            return *score;
        }
        if let Some(score) = self.scores.get(b).and_then(|inner| inner.get(a)) {
            return *score;
        }
        0.0
    }

    /// Number of stored directed entries.
    pub fn len(&self) -> usize {
        self.scores.values().map(|inner| inner.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
