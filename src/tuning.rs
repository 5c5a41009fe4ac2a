//! Data-driven game balance
//!
//! One [`Config`] is fixed for the lifetime of a run. Snapshots embed it and
//! replays pin it by content hash, so changing any value here invalidates
//! previously recorded replays.

use serde::{Deserialize, Serialize};

/// Balance table consumed by every gameplay pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // === Pacing ===
    /// Spawn interval at t=0 (seconds)
    pub base_spawn_every: f32,
    /// Floor for the ramped spawn interval
    pub min_spawn_every: f32,
    /// Seconds between difficulty ramp steps
    pub ramp_every: f32,
    /// Multiplier applied to the spawn interval per ramp step
    pub ramp_factor: f32,
    /// Enemy count above which spawning slows down
    pub soft_enemy_cap: usize,
    /// Distance from the player at which enemies appear
    pub spawn_radius: f32,

    // === Player ===
    pub player_radius: f32,
    pub player_speed: f32,
    pub player_max_hp: f32,
    /// Invulnerability window after taking a hit
    pub player_hurt_cooldown: f32,
    pub player_level_up_heal: f32,
    pub player_attack_cooldown: f32,
    pub player_attack_range: f32,
    pub player_damage: f32,
    pub player_knockback_speed: f32,
    pub player_knockback_damping: f32,

    // === Enemies ===
    pub enemy_radius: f32,
    pub enemy_speed: f32,
    pub enemy_hp: f32,
    pub enemy_touch_damage: f32,
    pub enemy_xp: f32,

    pub runner_radius: f32,
    pub runner_speed: f32,
    pub runner_hp: f32,
    pub runner_touch_damage: f32,
    pub runner_xp: f32,
    pub runner_shot_cooldown: f32,
    pub runner_shot_range: f32,
    pub runner_shot_speed: f32,
    pub runner_shot_damage: f32,
    pub runner_shot_life: f32,
    pub runner_shot_radius: f32,

    pub tank_radius: f32,
    pub tank_speed: f32,
    pub tank_hp: f32,
    pub tank_touch_damage: f32,
    pub tank_xp: f32,

    // === XP ===
    pub xp_orb_radius: f32,
    pub xp_pickup_padding: f32,
    pub xp_base_to_next: f32,
    pub xp_growth_to_next: f64,

    // === Feedback ===
    /// How long the attack flash stays visible
    pub attack_flash_time: f32,
    pub hit_flash_time: f32,
    pub hit_shake_duration: f32,
    pub hit_shake_magnitude: f32,
    pub hit_shake_freq1: f32,
    pub hit_shake_freq2: f32,

    // === Upgrades ===
    pub upgrade_damage: f32,
    pub upgrade_cooldown_factor: f32,
    pub upgrade_min_cooldown: f32,
    pub upgrade_max_hp: f32,
    pub upgrade_magnet: f32,
    pub upgrade_range: f32,
    pub upgrade_speed_factor: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_spawn_every: 0.75,
            min_spawn_every: 0.20,
            ramp_every: 15.0,
            ramp_factor: 0.92,
            soft_enemy_cap: 140,
            spawn_radius: 420.0,

            player_radius: 10.0,
            player_speed: 260.0,
            player_max_hp: 100.0,
            player_hurt_cooldown: 0.35,
            player_level_up_heal: 15.0,
            player_attack_cooldown: 0.45,
            player_attack_range: 180.0,
            player_damage: 25.0,
            player_knockback_speed: 520.0,
            player_knockback_damping: 18.0,

            enemy_radius: 9.0,
            enemy_speed: 120.0,
            enemy_hp: 50.0,
            enemy_touch_damage: 10.0,
            enemy_xp: 5.0,

            runner_radius: 7.0,
            runner_speed: 190.0,
            runner_hp: 30.0,
            runner_touch_damage: 8.0,
            runner_xp: 4.0,
            runner_shot_cooldown: 1.6,
            runner_shot_range: 260.0,
            runner_shot_speed: 240.0,
            runner_shot_damage: 6.0,
            runner_shot_life: 2.5,
            runner_shot_radius: 4.0,

            tank_radius: 14.0,
            tank_speed: 75.0,
            tank_hp: 140.0,
            tank_touch_damage: 18.0,
            tank_xp: 12.0,

            xp_orb_radius: 6.0,
            xp_pickup_padding: 10.0,
            xp_base_to_next: 25.0,
            xp_growth_to_next: 1.28,

            attack_flash_time: 0.08,
            hit_flash_time: 0.10,
            hit_shake_duration: 0.12,
            hit_shake_magnitude: 6.0,
            hit_shake_freq1: 26.0,
            hit_shake_freq2: 33.0,

            upgrade_damage: 10.0,
            upgrade_cooldown_factor: 0.85,
            upgrade_min_cooldown: 0.12,
            upgrade_max_hp: 20.0,
            upgrade_magnet: 40.0,
            upgrade_range: 20.0,
            upgrade_speed_factor: 1.10,
        }
    }
}

impl Config {
    /// XP needed to go from `level` to `level + 1`.
    /// Level 1 costs the base amount, each later level grows multiplicatively.
    pub fn xp_to_next(&self, level: u32) -> f32 {
        let level = level.max(1);
        (f64::from(self.xp_base_to_next) * self.xp_growth_to_next.powi(level as i32 - 1)) as f32
    }

    /// Lowercase hex BLAKE3 digest of the compact JSON encoding
    pub fn content_hash(&self) -> String {
        // Serializing a plain struct of numbers cannot fail
        let blob = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&blob).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_curve() {
        let cfg = Config::default();
        assert!((cfg.xp_to_next(0) - 25.0).abs() < 1e-4);
        assert!((cfg.xp_to_next(1) - 25.0).abs() < 1e-4);
        assert!((cfg.xp_to_next(2) - 32.0).abs() < 1e-4);
        assert!((cfg.xp_to_next(3) - 40.96).abs() < 1e-3);
    }

    #[test]
    fn test_content_hash_tracks_values() {
        let a = Config::default();
        let mut b = Config::default();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);

        b.player_damage += 1.0;
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
