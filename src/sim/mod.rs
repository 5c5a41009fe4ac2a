//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded, draw-counted RNG only
//! - Enemies keyed by ID, never by list position
//! - No rendering or platform dependencies

pub mod ai;
pub mod autopilot;
pub mod command;
pub mod math;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod upgrade;
pub mod weapons;
pub mod world;

pub use autopilot::autopilot_frame;
pub use command::{Command, FrameInput, InputState, ReplySlot};
pub use rng::SimRng;
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
pub use state::{
    AttackFlash, Enemy, EnemyKind, EnemyProjectile, Player, RunPhase, ShakeState, SimState, Stats,
    WeaponDrop, XpOrb,
};
pub use tick::{IntentMap, step};
pub use upgrade::{UpgradeKind, UpgradeMenu, UpgradeOption};
pub use weapons::{AttackStyle, WeaponKind};
pub use world::World;
