//! Error types for snapshot and file operations

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a snapshot is refused. The world is left untouched.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot version {found} does not match expected {expected}")]
    Version { found: u32, expected: u32 },
    #[error("invalid world size {width}x{height}")]
    WorldSize { width: f32, height: f32 },
    #[error("snapshot config hash {found} does not match its embedded config ({expected})")]
    ConfigHash { expected: String, found: String },
    #[error("pending AI request for tick {found} does not match snapshot AI tick {expected}")]
    PendingTick { found: u64, expected: u64 },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("empty file path")]
    EmptyPath,
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("replay version {found} does not match expected {expected}")]
    ReplayVersion { found: u32, expected: u32 },
    #[error("replay recorded with config {expected}, current config is {found}")]
    ReplayConfigMismatch { expected: String, found: String },
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }
}
