//! Simulation state and entity records
//!
//! Everything a snapshot must capture to resume a run lives in [`SimState`].
//! Entities are plain data; all behavior lives in the tick passes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::math::Bounds;
use super::rng::SimRng;
use super::upgrade::UpgradeMenu;
use super::weapons::WeaponKind;
use crate::jobs::EnemyRole;
use crate::tuning::Config;

/// Run-level state, derived from the run flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Paused,
    /// Waiting for level-up choices
    UpgradeMenu,
    /// Terminal until restart
    GameOver,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f32,
    pub radius: f32,

    // Auto attack
    pub weapon: WeaponKind,
    pub attack_cooldown: f32,
    /// Counts down to 0, attack fires when it runs out
    pub attack_timer: f32,
    pub attack_range: f32,
    pub damage: f32,

    // Health
    pub hp: f32,
    pub max_hp: f32,
    pub hurt_cooldown: f32,
    /// Invulnerability remaining after a hit
    pub hurt_timer: f32,

    // Progression
    pub level: u32,
    pub xp: f32,
    pub xp_to_next: f32,
    /// Extra pickup radius for XP orbs
    pub xp_magnet: f32,

    pub knock_vel: Vec2,
    pub moving: bool,
}

impl Player {
    pub fn new(pos: Vec2, cfg: &Config) -> Self {
        Self {
            pos,
            speed: cfg.player_speed,
            radius: cfg.player_radius,
            weapon: WeaponKind::Whip,
            attack_cooldown: cfg.player_attack_cooldown,
            attack_timer: 0.0,
            attack_range: cfg.player_attack_range,
            damage: cfg.player_damage,
            hp: cfg.player_max_hp,
            max_hp: cfg.player_max_hp,
            hurt_cooldown: cfg.player_hurt_cooldown,
            hurt_timer: 0.0,
            level: 1,
            xp: 0.0,
            xp_to_next: cfg.xp_to_next(1),
            xp_magnet: 0.0,
            knock_vel: Vec2::ZERO,
            moving: false,
        }
    }
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Normal,
    Runner,
    Tank,
}

impl EnemyKind {
    /// Archetype for the `n`-th spawned enemy (1-based):
    /// every 12th is a tank, every 4th a runner, the rest normal
    pub fn for_spawn_number(n: u32) -> Self {
        if n % 12 == 0 {
            EnemyKind::Tank
        } else if n % 4 == 0 {
            EnemyKind::Runner
        } else {
            EnemyKind::Normal
        }
    }

    pub fn role(self) -> EnemyRole {
        match self {
            EnemyKind::Normal => EnemyRole::Normal,
            EnemyKind::Runner => EnemyRole::Runner,
            EnemyKind::Tank => EnemyRole::Tank,
        }
    }

    pub fn sprite_key(self) -> &'static str {
        match self {
            EnemyKind::Normal => "enemy_normal",
            EnemyKind::Runner => "enemy_runner",
            EnemyKind::Tank => "enemy_tank",
        }
    }
}

/// An enemy entity. IDs are unique for the whole run and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Hit flash timer (seconds)
    pub hit_flash: f32,
    pub touch_damage: f32,
    pub kind: EnemyKind,
    pub xp_value: f32,
    /// Ranged attack countdown, runners only
    pub shot_timer: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, cfg: &Config) -> Self {
        let (radius, speed, hp, touch_damage, xp_value) = match kind {
            EnemyKind::Normal => (
                cfg.enemy_radius,
                cfg.enemy_speed,
                cfg.enemy_hp,
                cfg.enemy_touch_damage,
                cfg.enemy_xp,
            ),
            EnemyKind::Runner => (
                cfg.runner_radius,
                cfg.runner_speed,
                cfg.runner_hp,
                cfg.runner_touch_damage,
                cfg.runner_xp,
            ),
            EnemyKind::Tank => (
                cfg.tank_radius,
                cfg.tank_speed,
                cfg.tank_hp,
                cfg.tank_touch_damage,
                cfg.tank_xp,
            ),
        };
        let shot_timer = if kind == EnemyKind::Runner {
            cfg.runner_shot_cooldown
        } else {
            0.0
        };
        Self {
            id,
            pos,
            speed,
            radius,
            hp,
            max_hp: hp,
            hit_flash: 0.0,
            touch_damage,
            kind,
            xp_value,
            shot_timer,
        }
    }
}

/// XP pickup left behind by a kill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpOrb {
    pub pos: Vec2,
    pub radius: f32,
    pub value: f32,
}

/// Weapon pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDrop {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: WeaponKind,
}

/// Shot fired by a ranged enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Seconds left before expiry
    pub life: f32,
}

/// Run statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub enemies_spawned: u32,
    pub enemies_killed: u32,
    pub damage_taken: f32,
    pub xp_collected: f32,
    pub weapons_collected: u32,
}

/// Last attack, kept around briefly for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackFlash {
    pub pos: Vec2,
    pub timer: f32,
    pub radius: f32,
    pub weapon: WeaponKind,
}

/// Screen shake on taking damage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShakeState {
    pub timer: f32,
    pub phase: f32,
    pub offset: Vec2,
}

/// Complete mutable simulation state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub width: f32,
    pub height: f32,
    pub config: Config,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub orbs: Vec<XpOrb>,
    pub drops: Vec<WeaponDrop>,
    pub shots: Vec<EnemyProjectile>,

    pub spawn_timer: f32,
    pub spawn_every: f32,

    pub attack_flash: AttackFlash,

    pub time_survived: f32,
    pub game_over: bool,
    pub paused: bool,
    pub upgrade: UpgradeMenu,
    pub stats: Stats,
    pub shake: ShakeState,

    pub next_enemy_id: u32,
    pub rng: SimRng,
}

impl SimState {
    /// Fresh run with the player in the middle of the world
    pub fn new(width: f32, height: f32, config: Config, seed: u64) -> Self {
        let bounds = Bounds::new(width, height);
        Self {
            width,
            height,
            player: Player::new(bounds.center(), &config),
            enemies: Vec::with_capacity(256),
            orbs: Vec::new(),
            drops: Vec::new(),
            shots: Vec::new(),
            spawn_timer: 0.0,
            spawn_every: config.base_spawn_every,
            attack_flash: AttackFlash::default(),
            time_survived: 0.0,
            game_over: false,
            paused: false,
            upgrade: UpgradeMenu::default(),
            stats: Stats::default(),
            shake: ShakeState::default(),
            next_enemy_id: 1,
            rng: SimRng::new(seed),
            config,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Allocate a new enemy ID
    pub fn next_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    pub fn phase(&self) -> RunPhase {
        if self.game_over {
            RunPhase::GameOver
        } else if self.paused {
            RunPhase::Paused
        } else if self.upgrade.active {
            RunPhase::UpgradeMenu
        } else {
            RunPhase::Running
        }
    }

    /// True when gameplay passes are allowed to advance
    pub fn is_running(&self) -> bool {
        self.phase() == RunPhase::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_centers_player() {
        let state = SimState::new(2000.0, 1000.0, Config::default(), 1);
        assert_eq!(state.player.pos, Vec2::new(1000.0, 500.0));
        assert_eq!(state.player.level, 1);
        assert_eq!(state.phase(), RunPhase::Running);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_enemy_ids_increase() {
        let mut state = SimState::new(100.0, 100.0, Config::default(), 1);
        let a = state.next_enemy_id();
        let b = state.next_enemy_id();
        assert!(b > a);
    }

    #[test]
    fn test_spawn_schedule() {
        let kinds: Vec<_> = (1..=12).map(EnemyKind::for_spawn_number).collect();
        assert_eq!(kinds[3], EnemyKind::Runner);
        assert_eq!(kinds[7], EnemyKind::Runner);
        assert_eq!(kinds[11], EnemyKind::Tank);
        assert_eq!(kinds.iter().filter(|k| **k == EnemyKind::Normal).count(), 9);
    }

    #[test]
    fn test_phase_precedence() {
        let mut state = SimState::new(100.0, 100.0, Config::default(), 1);
        state.upgrade.active = true;
        assert_eq!(state.phase(), RunPhase::UpgradeMenu);
        state.paused = true;
        assert_eq!(state.phase(), RunPhase::Paused);
        state.game_over = true;
        assert_eq!(state.phase(), RunPhase::GameOver);
        assert!(!state.is_running());
    }
}
