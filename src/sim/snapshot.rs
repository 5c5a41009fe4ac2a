//! Versioned world snapshots
//!
//! A snapshot is a deep copy of [`SimState`] plus the AI tick, the request
//! awaiting consumption for that tick, and a hash of the embedded config.
//! Applying one validates everything first and only then replaces the
//! world, so a rejected snapshot changes nothing.

use serde::{Deserialize, Serialize};

use super::state::SimState;
use super::world::World;
use crate::error::SnapshotError;
use crate::jobs::IntentRequest;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// BLAKE3 of `state.config`
    pub config_hash: String,
    pub ai_tick: u64,
    /// Request submitted for `ai_tick`, consumed by the next tick. Captured
    /// verbatim since commands may have moved entities after it was built.
    #[serde(default)]
    pub pending: Option<IntentRequest>,
    /// Player input already applied in the tick the snapshot was taken in
    #[serde(default)]
    pub input_applied: bool,
    pub state: SimState,
}

impl Snapshot {
    /// Check the snapshot without touching any world
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let (width, height) = (self.state.width, self.state.height);
        // Also rejects NaN
        if !(width > 0.0 && height > 0.0) {
            return Err(SnapshotError::WorldSize { width, height });
        }
        let actual = self.state.config.content_hash();
        if actual != self.config_hash {
            return Err(SnapshotError::ConfigHash {
                expected: self.config_hash.clone(),
                found: actual,
            });
        }
        if let Some(req) = &self.pending {
            if req.tick != self.ai_tick {
                return Err(SnapshotError::PendingTick {
                    found: req.tick,
                    expected: self.ai_tick,
                });
            }
        }
        Ok(())
    }
}

impl World {
    pub fn build_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            config_hash: self.state.config.content_hash(),
            ai_tick: self.ai.ai_tick(),
            pending: self.ai.pending_request(self.ai.ai_tick()).cloned(),
            input_applied: self.input_applied,
            state: self.state.clone(),
        }
    }

    /// Replace the whole world with `snapshot`.
    ///
    /// The RNG resumes at the recorded draw position. The AI pool is rebuilt
    /// with empty tables, then the captured request for the current window
    /// is put back so the next tick consumes the same intents the saved run
    /// would have.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;

        self.state = snapshot.state;
        self.input_applied = snapshot.input_applied;
        self.ai.reset(snapshot.ai_tick);
        if let Some(req) = snapshot.pending {
            self.ai.restore_pending(req);
        }

        log::debug!(
            "snapshot applied: ai tick {}, {} enemies, rng draws {}",
            snapshot.ai_tick,
            self.state.enemies.len(),
            self.state.rng.draws()
        );
        Ok(())
    }
}
