//! Horde Lab - deterministic simulation core for a horde survival game
//!
//! Core modules:
//! - `sim`: Fixed-step world, gameplay passes, snapshots
//! - `jobs`: Enemy AI intents and the worker pool that computes them
//! - `persistence`: Atomic JSON save/load, replays
//! - `tuning`: Data-driven game balance
//! - `render`: Read-only view and asset lookup for renderers

pub mod error;
pub mod highscores;
pub mod jobs;
pub mod persistence;
pub mod render;
pub mod settings;
pub mod sim;
pub mod telemetry;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use sim::World;

pub use sim::math::{Bounds, Vec2};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default world dimensions
    pub const WORLD_WIDTH: f32 = 2000.0;
    pub const WORLD_HEIGHT: f32 = 2000.0;

    pub const DEFAULT_SEED: u64 = 1;
}
