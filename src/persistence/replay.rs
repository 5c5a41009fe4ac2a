//! Replay recording and playback
//!
//! A replay is the initial snapshot plus one frame of player input per
//! simulated tick. Playback restores the snapshot and feeds the frames back
//! through the command inbox in their original order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{read_json, write_json_atomic};
use crate::error::{PersistError, SnapshotError};
use crate::sim::command::FrameInput;
use crate::sim::snapshot::{SNAPSHOT_VERSION, Snapshot};
use crate::sim::world::World;

pub const REPLAY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    pub version: u32,
    pub fixed_step_seconds: f32,
    pub seed: u64,
    /// Config in effect when recording started
    pub config_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u64,
    #[serde(flatten)]
    pub frame: FrameInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFile {
    pub header: ReplayHeader,
    pub initial: Snapshot,
    pub frames: Vec<ReplayFrame>,
}

impl ReplayFile {
    /// Version checks for the file and the embedded snapshot
    pub fn check_versions(&self) -> Result<(), PersistError> {
        if self.header.version != REPLAY_VERSION {
            return Err(PersistError::ReplayVersion {
                found: self.header.version,
                expected: REPLAY_VERSION,
            });
        }
        if self.initial.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: self.initial.version,
                expected: SNAPSHOT_VERSION,
            }
            .into());
        }
        Ok(())
    }
}

/// Captures frames from a live world
pub struct ReplayRecorder {
    header: ReplayHeader,
    initial: Snapshot,
    frames: Vec<ReplayFrame>,
}

impl ReplayRecorder {
    /// Snapshot `world` and rebase it onto that snapshot, so the live run and
    /// a later playback start from identical state, AI tables included.
    pub fn start(world: &mut World, fixed_step_seconds: f32) -> Result<Self, SnapshotError> {
        let initial = world.build_snapshot();
        world.apply_snapshot(initial.clone())?;

        log::info!(
            "replay recording started at ai tick {}",
            initial.ai_tick
        );
        Ok(Self {
            header: ReplayHeader {
                version: REPLAY_VERSION,
                fixed_step_seconds,
                seed: initial.state.rng.seed(),
                config_hash: initial.config_hash.clone(),
            },
            initial,
            frames: Vec::new(),
        })
    }

    /// Record `frame` and queue its commands on `world` for the next tick
    pub fn record(&mut self, world: &mut World, frame: FrameInput) {
        for cmd in frame.commands() {
            world.enqueue(cmd);
        }
        self.frames.push(ReplayFrame {
            tick: self.frames.len() as u64,
            frame,
        });
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn finish(self) -> ReplayFile {
        log::info!("replay recording finished: {} frames", self.frames.len());
        ReplayFile {
            header: self.header,
            initial: self.initial,
            frames: self.frames,
        }
    }
}

/// Feeds a recorded frame sequence into a world
pub struct ReplayPlayer {
    fixed_step_seconds: f32,
    frames: Vec<ReplayFrame>,
    cursor: usize,
}

impl ReplayPlayer {
    /// Validate `file` against `world`'s config and restore its initial
    /// snapshot. On error the world is untouched.
    pub fn new(file: ReplayFile, world: &mut World) -> Result<Self, PersistError> {
        file.check_versions()?;

        let current = world.config().content_hash();
        if file.header.config_hash != current {
            return Err(PersistError::ReplayConfigMismatch {
                expected: file.header.config_hash,
                found: current,
            });
        }
        if file.initial.config_hash != file.header.config_hash {
            return Err(PersistError::ReplayConfigMismatch {
                expected: file.header.config_hash,
                found: file.initial.config_hash,
            });
        }

        world.apply_snapshot(file.initial)?;
        log::info!("replay started: {} frames", file.frames.len());

        Ok(Self {
            fixed_step_seconds: file.header.fixed_step_seconds,
            frames: file.frames,
            cursor: 0,
        })
    }

    pub fn fixed_step(&self) -> f32 {
        self.fixed_step_seconds
    }

    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }

    /// Queue the next frame's commands. Returns `false` once frames run out.
    pub fn next_frame(&mut self, world: &mut World) -> bool {
        let Some(frame) = self.frames.get(self.cursor) else {
            return false;
        };
        for cmd in frame.frame.commands() {
            world.enqueue(cmd);
        }
        self.cursor += 1;
        if self.is_finished() {
            log::info!("replay finished, returning to live input");
        }
        true
    }
}

pub fn save_replay(path: &Path, replay: &ReplayFile) -> Result<(), PersistError> {
    write_json_atomic(path, replay)?;
    log::info!(
        "replay saved to {} ({} frames)",
        path.display(),
        replay.frames.len()
    );
    Ok(())
}

/// Load and version-check a replay file
pub fn load_replay(path: &Path) -> Result<ReplayFile, PersistError> {
    let replay: ReplayFile = read_json(path)?;
    replay.check_versions()?;
    Ok(replay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::command::InputState;
    use crate::tuning::Config;

    fn world(seed: u64, pooled: bool) -> World {
        let mut w = World::with_config(2000.0, 2000.0, Config::default(), seed);
        if !pooled {
            w.disable_ai_workers();
        }
        w
    }

    fn frame(t: u32) -> FrameInput {
        FrameInput {
            input: InputState {
                up: t % 90 < 30,
                left: t % 120 >= 60,
                right: t % 200 < 50,
                down: t % 90 >= 60,
            },
            toggle_pause: t == 300 || t == 340,
            choose: (t % 11 == 0).then_some((t % 2) as u8),
            restart: false,
        }
    }

    fn record(w: &mut World, ticks: u32) -> ReplayFile {
        let mut rec = ReplayRecorder::start(w, SIM_DT).unwrap();
        for t in 0..ticks {
            rec.record(w, frame(t));
            w.tick(SIM_DT);
        }
        assert_eq!(rec.frame_count(), ticks as usize);
        rec.finish()
    }

    fn play(file: ReplayFile, w: &mut World) {
        let mut player = ReplayPlayer::new(file, w).unwrap();
        while player.next_frame(w) {
            w.tick(player.fixed_step());
        }
        assert_eq!(player.remaining(), 0);
    }

    #[test]
    fn test_replay_reproduces_live_run() {
        let mut live = world(17, true);
        // Start mid-run to exercise the rebase
        for _ in 0..120 {
            live.tick(SIM_DT);
        }
        let file = record(&mut live, 1200);

        let mut replayed = world(1, false);
        play(file, &mut replayed);
        assert_eq!(replayed.state(), live.state());
        assert_eq!(replayed.ai_tick(), live.ai_tick());
    }

    #[test]
    fn test_replay_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.replay.json");
        let mut live = world(3, false);
        let file = record(&mut live, 600);
        save_replay(&path, &file).unwrap();

        let loaded = load_replay(&path).unwrap();
        assert_eq!(loaded.header.seed, 3);
        assert_eq!(loaded.frames.len(), 600);

        let mut replayed = world(9, false);
        play(loaded, &mut replayed);
        assert_eq!(replayed.state(), live.state());
    }

    #[test]
    fn test_config_mismatch_rejected() {
        let mut live = world(3, false);
        let file = record(&mut live, 10);

        let mut cfg = Config::default();
        cfg.enemy_speed += 1.0;
        let mut other = World::with_config(2000.0, 2000.0, cfg, 3);
        other.disable_ai_workers();
        let before = other.build_snapshot();

        let err = ReplayPlayer::new(file, &mut other).err().unwrap();
        assert!(matches!(err, PersistError::ReplayConfigMismatch { .. }));
        assert_eq!(other.build_snapshot(), before);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        let mut live = world(3, false);
        let mut file = record(&mut live, 5);
        file.header.version = REPLAY_VERSION + 1;
        write_json_atomic(&path, &file).unwrap();
        assert!(matches!(
            load_replay(&path),
            Err(PersistError::ReplayVersion { .. })
        ));

        file.header.version = REPLAY_VERSION;
        file.initial.version = SNAPSHOT_VERSION + 1;
        write_json_atomic(&path, &file).unwrap();
        assert!(matches!(
            load_replay(&path),
            Err(PersistError::Snapshot(SnapshotError::Version { .. }))
        ));
    }

    #[test]
    fn test_playback_ends_and_returns_control() {
        let mut live = world(3, false);
        let file = record(&mut live, 3);
        let mut w = world(3, false);
        let mut player = ReplayPlayer::new(file, &mut w).unwrap();
        let mut ticks = 0;
        while player.next_frame(&mut w) {
            w.tick(SIM_DT);
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert!(player.is_finished());
        assert!(!player.next_frame(&mut w));
    }
}
