//! High score leaderboard
//!
//! Tracks the top 10 runs, persisted as JSON next to the snapshots.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::persistence;
use crate::sim::state::SimState;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub kills: u32,
    pub time_survived: f32,
    pub level: u32,
    pub seed: u64,
}

impl HighScoreEntry {
    /// Score a run: kills x100, tenths of a second survived, level x50
    pub fn from_state(state: &SimState) -> Self {
        let kills = state.stats.enemies_killed;
        let level = state.player.level;
        let time = state.time_survived.max(0.0);
        let score =
            u64::from(kills) * 100 + (time * 10.0).floor() as u64 + u64::from(level) * 50;
        Self {
            score,
            kills,
            time_survived: time,
            level,
            seed: state.rng.seed(),
        }
    }

    /// True if `self` ranks above `other`
    fn beats(&self, other: &Self) -> bool {
        (self.score, self.kills)
            .cmp(&(other.score, other.kills))
            .then(self.time_survived.total_cmp(&other.time_survived))
            .is_gt()
    }
}

/// High score leaderboard, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if an entry would make the board
    pub fn qualifies(&self, entry: &HighScoreEntry) -> bool {
        if entry.score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| entry.beats(e)).unwrap_or(true)
    }

    /// Add an entry if it qualifies.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(&entry) {
            return None;
        }

        // Sorted descending; equal entries keep arrival order
        let pos = self
            .entries
            .iter()
            .position(|e| entry.beats(e))
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from `path`; a missing or corrupt file starts a fresh board
    pub fn load(path: &Path) -> Self {
        match persistence::read_json::<HighScores>(path) {
            Ok(mut scores) => {
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) => {
                log::info!("no high scores loaded ({e}), starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        persistence::write_json_atomic(path, self)?;
        log::info!("high scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
