//! Launch settings
//!
//! Everything here configures a session, not the game balance. Balance lives
//! in [`crate::tuning::Config`] and is pinned by replays; settings are not.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::PersistError;
use crate::jobs::{DEFAULT_QUEUE_DEPTH, default_worker_count};
use crate::persistence;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    pub seed: u64,
    /// Seconds per simulation tick
    pub fixed_step: f32,

    // === AI ===
    /// Worker threads; 0 computes every intent inline
    pub ai_workers: usize,
    pub ai_queue_depth: usize,

    // === Files ===
    pub snapshot_path: PathBuf,
    pub replay_path: PathBuf,
    pub highscores_path: PathBuf,

    // === Telemetry ===
    /// Frames per logged telemetry batch
    pub telemetry_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: consts::WORLD_WIDTH,
            world_height: consts::WORLD_HEIGHT,
            seed: consts::DEFAULT_SEED,
            fixed_step: consts::SIM_DT,

            ai_workers: default_worker_count(),
            ai_queue_depth: DEFAULT_QUEUE_DEPTH,

            snapshot_path: PathBuf::from("saves/snapshot.json"),
            replay_path: PathBuf::from("saves/replay.json"),
            highscores_path: PathBuf::from("saves/highscores.json"),

            telemetry_interval: 600,
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or unreadable. Missing fields take their default values.
    pub fn load(path: &Path) -> Self {
        match persistence::read_json::<Settings>(path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(PersistError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("no settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        persistence::write_json_atomic(path, self)
    }

    /// Replace values that cannot drive a simulation
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            log::warn!(
                "invalid world size {}x{}, using default",
                self.world_width,
                self.world_height
            );
            self.world_width = defaults.world_width;
            self.world_height = defaults.world_height;
        }
        if !(self.fixed_step > 0.0) {
            self.fixed_step = defaults.fixed_step;
        }
        self.ai_queue_depth = self.ai_queue_depth.max(1);
        self.telemetry_interval = self.telemetry_interval.max(1);
        self
    }
}
