//! Save/load of snapshots and replays
//!
//! Files are pretty JSON written to `<path>.tmp` and renamed into place, so a
//! crash mid-write never leaves a truncated file behind. Reads are fully
//! decoded and validated before anything is applied.

pub mod replay;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistError;
use crate::sim::snapshot::Snapshot;
use crate::sim::world::World;

pub use replay::{
    REPLAY_VERSION, ReplayFile, ReplayFrame, ReplayHeader, ReplayPlayer, ReplayRecorder,
    load_replay, save_replay,
};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `value` and atomically replace `path` with it
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if path.as_os_str().is_empty() {
        return Err(PersistError::EmptyPath);
    }

    let blob = serde_json::to_vec_pretty(value)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| PersistError::io(dir, e))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, &blob).map_err(|e| PersistError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistError::io(path, e));
    }
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    if path.as_os_str().is_empty() {
        return Err(PersistError::EmptyPath);
    }
    let blob = fs::read(path).map_err(|e| PersistError::io(path, e))?;
    Ok(serde_json::from_slice(&blob)?)
}

pub fn save_snapshot(world: &World, path: &Path) -> Result<(), PersistError> {
    let res = write_json_atomic(path, &world.build_snapshot());
    match &res {
        Ok(()) => log::info!("snapshot saved to {}", path.display()),
        Err(e) => log::warn!("snapshot save failed: {e}"),
    }
    res
}

pub fn load_snapshot(world: &mut World, path: &Path) -> Result<(), PersistError> {
    let res = read_json::<Snapshot>(path)
        .and_then(|snap| world.apply_snapshot(snap).map_err(PersistError::from));
    match &res {
        Ok(()) => log::info!("snapshot loaded from {}", path.display()),
        Err(e) => log::warn!("snapshot load failed: {e}"),
    }
    res
}
