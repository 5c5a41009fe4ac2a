//! Fixed timestep gameplay passes
//!
//! [`step`] advances an active run by one tick. The scheduler decides whether
//! the run is active and which intents apply; everything here is plain
//! mutation of [`SimState`] in a fixed order.

use std::collections::HashMap;

use glam::Vec2;

use super::math::{circles_overlap, direction_from_angle, dist2};
use super::state::{AttackFlash, Enemy, EnemyKind, EnemyProjectile, SimState, WeaponDrop, XpOrb};
use super::weapons::{AttackStyle, drop_chance, roll_weapon};
use crate::jobs::intents::{EnemyIntent, SPEED_SCALE_MAX, SPEED_SCALE_MIN};
use crate::telemetry::TelemetryEvent;

/// Consumed intents for one tick, keyed by enemy ID
pub type IntentMap = HashMap<u32, EnemyIntent>;

/// Knockback below this summed |vx| + |vy| snaps to zero
const KNOCKBACK_REST: f32 = 1.0;

/// Run every gameplay pass once. Returns the telemetry produced this tick.
pub fn step(state: &mut SimState, intents: &IntentMap, dt: f32) -> Vec<TelemetryEvent> {
    let mut events = Vec::new();

    state.time_survived += dt;

    state.update_difficulty();
    state.update_spawning(dt);
    state.update_enemies(dt, intents);
    state.update_combat(dt, &mut events);
    state.update_ranged_enemies(dt);
    state.update_knockback(dt);
    state.update_contact_damage(dt, &mut events);
    state.update_projectiles(dt, &mut events);
    state.update_xp_orbs();
    state.update_weapon_drops(&mut events);
    state.update_shake(dt);
    state.update_level_up(&mut events);

    events
}

impl SimState {
    // ========================================================================
    // Spawning and difficulty
    // ========================================================================

    /// Spawn interval decays exponentially with time survived, floored
    pub fn update_difficulty(&mut self) {
        let cfg = &self.config;
        if cfg.ramp_every <= 0.0 {
            return;
        }
        let steps = (self.time_survived / cfg.ramp_every).floor() as i32;
        self.spawn_every = (cfg.base_spawn_every * cfg.ramp_factor.powi(steps))
            .max(cfg.min_spawn_every);
    }

    pub fn update_spawning(&mut self, dt: f32) {
        let mut effective_every = self.spawn_every;
        let cap = self.config.soft_enemy_cap;
        if cap > 0 && self.enemies.len() > cap {
            // Above the cap the interval stretches linearly, spawning never stops
            let over = (self.enemies.len() - cap) as f32 / cap as f32;
            effective_every *= 1.0 + over;
        }
        if effective_every <= 0.0 {
            return;
        }

        self.spawn_timer += dt;
        while self.spawn_timer >= effective_every {
            self.spawn_timer -= effective_every;
            self.spawn_enemy_near_player();
        }
    }

    fn spawn_enemy_near_player(&mut self) {
        let angle = self.rng.next_angle();
        let offset = direction_from_angle(angle) * self.config.spawn_radius;
        let pos = self.bounds().clamp(self.player.pos + offset);

        let kind = EnemyKind::for_spawn_number(self.stats.enemies_spawned + 1);
        let id = self.next_enemy_id();
        self.enemies.push(Enemy::new(id, kind, pos, &self.config));
        self.stats.enemies_spawned += 1;
    }

    // ========================================================================
    // Enemy movement
    // ========================================================================

    pub fn update_enemies(&mut self, dt: f32, intents: &IntentMap) {
        let target = self.player.pos;
        let bounds = self.bounds();

        for e in &mut self.enemies {
            e.hit_flash = (e.hit_flash - dt).max(0.0);

            let (dir, scale) = match intents.get(&e.id) {
                Some(intent) => (
                    intent.dir,
                    intent.speed_scale.clamp(SPEED_SCALE_MIN, SPEED_SCALE_MAX),
                ),
                // No intent: plain chase
                None => ((target - e.pos).normalize_or_zero(), 1.0),
            };
            if dir == Vec2::ZERO {
                continue;
            }

            e.pos = bounds.clamp(e.pos + dir * e.speed * scale * dt);
        }
    }

    // ========================================================================
    // Player combat
    // ========================================================================

    pub fn update_combat(&mut self, dt: f32, events: &mut Vec<TelemetryEvent>) {
        if self.attack_flash.timer > 0.0 {
            self.attack_flash.timer = (self.attack_flash.timer - dt).max(0.0);
        }

        if self.player.attack_timer > 0.0 {
            self.player.attack_timer -= dt;
            if self.player.attack_timer > 0.0 {
                return;
            }
        }

        let weapon = self.player.weapon;
        let def = weapon.def();
        let (reach, limit) = match def.style {
            AttackStyle::Single => (self.player.attack_range * def.range_mul, 1),
            AttackStyle::Pierce => (self.player.attack_range * def.range_mul, def.max_targets),
            AttackStyle::Radial => (def.attack_radius, def.max_targets),
        };

        let mut targets = self.nearest_enemies_in_range(self.player.pos, reach, limit);
        let Some(&first) = targets.first() else {
            // Nothing in range; stay ready
            return;
        };

        self.player.attack_timer = self.player.attack_cooldown * def.cooldown_mul;
        self.attack_flash = AttackFlash {
            pos: match def.style {
                AttackStyle::Radial => self.player.pos,
                _ => self.enemies[first].pos,
            },
            timer: self.config.attack_flash_time,
            radius: if def.style == AttackStyle::Radial {
                def.attack_radius
            } else {
                0.0
            },
            weapon,
        };

        let damage = self.player.damage * def.damage_mul;
        // Highest index first so swap_remove never moves an unvisited target
        targets.sort_unstable_by(|a, b| b.cmp(a));
        for idx in targets {
            let e = &mut self.enemies[idx];
            e.hp -= damage;
            e.hit_flash = self.config.hit_flash_time;
            if e.hp <= 0.0 {
                let dead = self.enemies.swap_remove(idx);
                self.on_enemy_killed(&dead, events);
            }
        }
    }

    fn on_enemy_killed(&mut self, dead: &Enemy, events: &mut Vec<TelemetryEvent>) {
        self.orbs.push(XpOrb {
            pos: dead.pos,
            radius: self.config.xp_orb_radius,
            value: dead.xp_value,
        });
        self.stats.enemies_killed += 1;
        events.push(TelemetryEvent::Kill);

        if self.rng.next_f32() < drop_chance(dead.kind) {
            let kind = roll_weapon(&mut self.rng);
            self.drops.push(WeaponDrop {
                pos: dead.pos,
                radius: kind.def().drop_radius,
                kind,
            });
        }
    }

    /// Indices of up to `limit` enemies within `range` of `p`, nearest first.
    /// Ties keep list order.
    pub fn nearest_enemies_in_range(&self, p: Vec2, range: f32, limit: usize) -> Vec<usize> {
        let r2 = range * range;
        let mut hits: Vec<(f32, usize)> = self
            .enemies
            .iter()
            .enumerate()
            .map(|(i, e)| (dist2(e.pos, p), i))
            .filter(|(d2, _)| *d2 <= r2)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().take(limit).map(|(_, i)| i).collect()
    }

    // ========================================================================
    // Ranged enemies
    // ========================================================================

    /// Runners shoot back while the player wields an area weapon
    pub fn update_ranged_enemies(&mut self, dt: f32) {
        let radial = self.player.weapon.def().style == AttackStyle::Radial;
        let cfg = &self.config;
        let target = self.player.pos;
        let range2 = cfg.runner_shot_range * cfg.runner_shot_range;

        for e in self.enemies.iter_mut().filter(|e| e.kind == EnemyKind::Runner) {
            e.shot_timer = (e.shot_timer - dt).max(0.0);
            if !radial || e.shot_timer > 0.0 || dist2(e.pos, target) > range2 {
                continue;
            }
            let dir = (target - e.pos).normalize_or_zero();
            if dir == Vec2::ZERO {
                continue;
            }
            self.shots.push(EnemyProjectile {
                pos: e.pos,
                vel: dir * cfg.runner_shot_speed,
                radius: cfg.runner_shot_radius,
                damage: cfg.runner_shot_damage,
                life: cfg.runner_shot_life,
            });
            e.shot_timer = cfg.runner_shot_cooldown;
        }
    }

    // ========================================================================
    // Player physics and damage
    // ========================================================================

    pub fn update_knockback(&mut self, dt: f32) {
        let kv = self.player.knock_vel;
        if kv == Vec2::ZERO {
            return;
        }
        self.player.pos += kv * dt;

        // Damped Euler step
        let f = (1.0 - self.config.player_knockback_damping * dt).max(0.0);
        self.player.knock_vel = kv * f;

        self.player.pos = self.bounds().clamp(self.player.pos);

        let v = self.player.knock_vel;
        if v.x.abs() + v.y.abs() < KNOCKBACK_REST {
            self.player.knock_vel = Vec2::ZERO;
        }
    }

    /// First overlapping enemy hurts the player, at most once per hurt cooldown
    pub fn update_contact_damage(&mut self, dt: f32, events: &mut Vec<TelemetryEvent>) {
        if self.player.hurt_timer > 0.0 {
            self.player.hurt_timer -= dt;
            if self.player.hurt_timer > 0.0 {
                return;
            }
            self.player.hurt_timer = 0.0;
        }

        let p = self.player.pos;
        let pr = self.player.radius;
        let Some((enemy_pos, damage)) = self
            .enemies
            .iter()
            .find(|e| circles_overlap(p, pr, e.pos, e.radius))
            .map(|e| (e.pos, e.touch_damage))
        else {
            return;
        };

        self.player.hp -= damage;
        self.stats.damage_taken += damage;
        self.player.hurt_timer = self.player.hurt_cooldown;
        events.push(TelemetryEvent::DamageTaken(damage));

        let mut away = (p - enemy_pos).normalize_or_zero();
        if away == Vec2::ZERO {
            // Exact overlap: pick a direction from the seeded stream
            away = direction_from_angle(self.rng.next_angle());
        }
        self.player.knock_vel = away * self.config.player_knockback_speed;

        self.shake.timer = self.config.hit_shake_duration;
        self.shake.phase = 0.0;

        if self.player.hp <= 0.0 {
            self.player.hp = 0.0;
            self.game_over = true;
            log::info!(
                "game over at {:.1}s, level {}, {} kills",
                self.time_survived,
                self.player.level,
                self.stats.enemies_killed
            );
        }
    }

    /// Move shots, expire them, and resolve hits on the player.
    /// Shots never kill; game over only comes from contact damage.
    pub fn update_projectiles(&mut self, dt: f32, events: &mut Vec<TelemetryEvent>) {
        let bounds = self.bounds();
        let p = self.player.pos;
        let pr = self.player.radius;

        let mut i = 0;
        while i < self.shots.len() {
            let shot = &mut self.shots[i];
            shot.pos += shot.vel * dt;
            shot.life -= dt;

            if shot.life <= 0.0 || !bounds.contains(shot.pos) {
                self.shots.swap_remove(i);
                continue;
            }

            if circles_overlap(p, pr, shot.pos, shot.radius) {
                let damage = shot.damage;
                self.shots.swap_remove(i);
                if self.player.hurt_timer <= 0.0 {
                    let floor = self.player.hp.min(1.0);
                    let dealt = self.player.hp - (self.player.hp - damage).max(floor);
                    self.player.hp -= dealt;
                    self.stats.damage_taken += dealt;
                    self.player.hurt_timer = self.player.hurt_cooldown;
                    events.push(TelemetryEvent::DamageTaken(dealt));
                }
                continue;
            }
            i += 1;
        }
    }

    // ========================================================================
    // Pickups
    // ========================================================================

    pub fn update_xp_orbs(&mut self) {
        let p = self.player.pos;
        let pickup_r = self.player.radius + self.config.xp_pickup_padding + self.player.xp_magnet;

        let mut i = 0;
        while i < self.orbs.len() {
            let orb = &self.orbs[i];
            let rr = pickup_r + orb.radius;
            if dist2(p, orb.pos) <= rr * rr {
                let orb = self.orbs.swap_remove(i);
                self.player.xp += orb.value;
                self.stats.xp_collected += orb.value;
                continue;
            }
            i += 1;
        }
    }

    pub fn update_weapon_drops(&mut self, events: &mut Vec<TelemetryEvent>) {
        let p = self.player.pos;
        let pr = self.player.radius;

        let mut i = 0;
        while i < self.drops.len() {
            let drop = &self.drops[i];
            let rr = pr + drop.radius;
            if dist2(p, drop.pos) <= rr * rr {
                let drop = self.drops.swap_remove(i);
                self.player.weapon = drop.kind;
                self.stats.weapons_collected += 1;
                log::debug!("picked up {}", drop.kind);
                events.push(TelemetryEvent::WeaponPickup(drop.kind));
                continue;
            }
            i += 1;
        }
    }

    // ========================================================================
    // Feedback and progression
    // ========================================================================

    pub fn update_shake(&mut self, dt: f32) {
        let cfg = &self.config;
        let shake = &mut self.shake;
        if shake.timer <= 0.0 {
            shake.offset = Vec2::ZERO;
            return;
        }

        shake.timer -= dt;
        if shake.timer <= 0.0 {
            shake.timer = 0.0;
            shake.offset = Vec2::ZERO;
            return;
        }
        shake.phase += dt;

        let fade = if cfg.hit_shake_duration > 0.0 {
            (shake.timer / cfg.hit_shake_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let amp = cfg.hit_shake_magnitude * fade;
        shake.offset = Vec2::new(
            (shake.phase * cfg.hit_shake_freq1).sin() * amp,
            (shake.phase * cfg.hit_shake_freq2).cos() * amp,
        );
    }

    /// Drain XP into levels, queueing one upgrade choice per level
    pub fn update_level_up(&mut self, events: &mut Vec<TelemetryEvent>) {
        if self.upgrade.active {
            return;
        }

        let mut leveled = false;
        while self.player.xp_to_next > 0.0 && self.player.xp >= self.player.xp_to_next {
            let player = &mut self.player;
            player.xp -= player.xp_to_next;
            player.level += 1;
            player.xp_to_next = self.config.xp_to_next(player.level);

            player.hp = player.max_hp.min(player.hp + self.config.player_level_up_heal);
            player.max_hp += self.config.player_level_up_heal;

            self.upgrade.pending += 1;
            leveled = true;
            events.push(TelemetryEvent::LevelUp(player.level));
        }

        if leveled {
            log::debug!(
                "level {} reached, {} choice(s) pending",
                self.player.level,
                self.upgrade.pending
            );
            self.upgrade.open_if_needed(&self.config, &mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapons::WeaponKind;
    use crate::tuning::Config;

    const DT: f32 = 1.0 / 60.0;

    fn state() -> SimState {
        SimState::new(2000.0, 2000.0, Config::default(), 1)
    }

    fn place_enemy(s: &mut SimState, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = s.next_enemy_id();
        let e = Enemy::new(id, kind, pos, &s.config);
        s.enemies.push(e);
        id
    }

    #[test]
    fn test_first_spawn_at_spawn_radius() {
        let mut s = state();
        assert!(s.enemies.is_empty());
        s.update_spawning(0.75);
        assert_eq!(s.enemies.len(), 1);
        let d = s.enemies[0].pos.distance(Vec2::new(1000.0, 1000.0));
        assert!((d - 420.0).abs() < 1e-2, "distance {d}");
        assert_eq!(s.enemies[0].id, 1);
        assert_eq!(s.rng.draws(), 1);
    }

    #[test]
    fn test_one_enemy_after_base_interval() {
        let mut s = state();
        let none = IntentMap::new();
        // 45 ticks of 1/60 may fall a hair short of 0.75 in f32
        let mut ticks = 0;
        while s.enemies.is_empty() && ticks < 50 {
            step(&mut s, &none, DT);
            ticks += 1;
        }
        assert!((44..=46).contains(&ticks), "ticks {ticks}");
        assert_eq!(s.enemies.len(), 1);
    }

    #[test]
    fn test_soft_cap_slows_spawning() {
        let mut s = state();
        s.config.soft_enemy_cap = 2;
        for _ in 0..4 {
            place_enemy(&mut s, EnemyKind::Normal, Vec2::new(10.0, 10.0));
        }
        // 4 enemies over a cap of 2 doubles the interval
        s.update_spawning(0.75);
        assert_eq!(s.enemies.len(), 4);
        s.update_spawning(0.75);
        assert_eq!(s.enemies.len(), 5);
    }

    #[test]
    fn test_difficulty_ramp_floor() {
        let mut s = state();
        s.time_survived = 15.0;
        s.update_difficulty();
        assert!((s.spawn_every - 0.75 * 0.92).abs() < 1e-5);
        s.time_survived = 10_000.0;
        s.update_difficulty();
        assert_eq!(s.spawn_every, s.config.min_spawn_every);
    }

    #[test]
    fn test_single_target_attack_kills_in_two_hits() {
        let mut s = state();
        let mut events = Vec::new();
        let pos = s.player.pos + Vec2::new(100.0, 0.0);
        let id = place_enemy(&mut s, EnemyKind::Normal, pos);

        s.update_combat(DT, &mut events);
        assert_eq!(s.enemies[0].hp, 25.0);
        assert!((s.player.attack_timer - 0.45).abs() < 1e-6);

        // Cooldown holds the next swing
        s.update_combat(0.2, &mut events);
        assert_eq!(s.enemies[0].hp, 25.0);

        s.update_combat(0.3, &mut events);
        assert!(s.enemies.iter().all(|e| e.id != id));
        assert_eq!(s.orbs.len(), 1);
        assert_eq!(s.orbs[0].pos, pos);
        assert_eq!(s.stats.enemies_killed, 1);
        assert_eq!(events, vec![TelemetryEvent::Kill]);
    }

    #[test]
    fn test_attack_ignores_enemies_out_of_range() {
        let mut s = state();
        let mut events = Vec::new();
        let p = s.player.pos;
        place_enemy(&mut s, EnemyKind::Normal, p + Vec2::new(181.0, 0.0));
        s.update_combat(DT, &mut events);
        assert_eq!(s.enemies[0].hp, 50.0);
        assert_eq!(s.player.attack_timer, 0.0);
    }

    #[test]
    fn test_radial_attack_hits_many_and_removes_safely() {
        let mut s = state();
        let mut events = Vec::new();
        s.player.weapon = WeaponKind::Nova;
        s.player.damage = 100.0;
        let c = s.player.pos;
        for i in 0..5 {
            place_enemy(&mut s, EnemyKind::Normal, c + Vec2::new(20.0 * i as f32 + 10.0, 0.0));
        }
        // One outside the nova radius
        place_enemy(&mut s, EnemyKind::Normal, c + Vec2::new(0.0, 150.0));

        s.update_combat(DT, &mut events);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.stats.enemies_killed, 5);
        assert_eq!(s.orbs.len(), 5);
        assert_eq!(s.attack_flash.radius, 135.0);
    }

    #[test]
    fn test_pierce_hits_three_nearest() {
        let mut s = state();
        let mut events = Vec::new();
        s.player.weapon = WeaponKind::Spear;
        let c = s.player.pos;
        for i in 0..5 {
            place_enemy(&mut s, EnemyKind::Tank, c + Vec2::new(30.0 * (i + 1) as f32, 0.0));
        }
        s.update_combat(DT, &mut events);
        let hurt = s.enemies.iter().filter(|e| e.hp < e.max_hp).count();
        assert_eq!(hurt, 3);
        let far = s.enemies.iter().find(|e| e.id == 5).unwrap();
        assert_eq!(far.hp, far.max_hp);
    }

    #[test]
    fn test_contact_damage_once_per_cooldown() {
        let mut s = state();
        let mut events = Vec::new();
        let p = s.player.pos;
        place_enemy(&mut s, EnemyKind::Normal, p + Vec2::new(5.0, 0.0));
        place_enemy(&mut s, EnemyKind::Tank, p + Vec2::new(-5.0, 0.0));

        s.update_contact_damage(DT, &mut events);
        // Only the first overlap counts
        assert_eq!(s.player.hp, 90.0);
        assert!(s.player.knock_vel.x < 0.0);
        assert_eq!(s.shake.timer, s.config.hit_shake_duration);

        s.update_contact_damage(DT, &mut events);
        assert_eq!(s.player.hp, 90.0);
    }

    #[test]
    fn test_exact_overlap_knockback_draws_rng() {
        let mut s = state();
        let mut events = Vec::new();
        let p = s.player.pos;
        place_enemy(&mut s, EnemyKind::Normal, p);
        s.update_contact_damage(DT, &mut events);
        assert_eq!(s.rng.draws(), 1);
        let speed = s.player.knock_vel.length();
        assert!((speed - s.config.player_knockback_speed).abs() < 1e-2);
    }

    #[test]
    fn test_contact_can_end_the_run() {
        let mut s = state();
        let mut events = Vec::new();
        s.player.hp = 5.0;
        let p = s.player.pos;
        place_enemy(&mut s, EnemyKind::Normal, p + Vec2::new(3.0, 0.0));
        s.update_contact_damage(DT, &mut events);
        assert!(s.game_over);
        assert_eq!(s.player.hp, 0.0);
    }

    #[test]
    fn test_knockback_comes_to_rest() {
        let mut s = state();
        s.player.knock_vel = Vec2::new(520.0, 0.0);
        let start = s.player.pos;
        for _ in 0..200 {
            s.update_knockback(DT);
        }
        assert_eq!(s.player.knock_vel, Vec2::ZERO);
        assert!(s.player.pos.x > start.x);
    }

    #[test]
    fn test_runner_shots_only_against_radial_weapon() {
        let mut s = state();
        let p = s.player.pos;
        place_enemy(&mut s, EnemyKind::Runner, p + Vec2::new(200.0, 0.0));
        s.enemies[0].shot_timer = 0.0;

        s.update_ranged_enemies(DT);
        assert!(s.shots.is_empty());

        s.player.weapon = WeaponKind::Nova;
        s.update_ranged_enemies(DT);
        assert_eq!(s.shots.len(), 1);
        assert!(s.shots[0].vel.x < 0.0);
    }

    #[test]
    fn test_projectile_hits_are_not_lethal() {
        let mut s = state();
        let mut events = Vec::new();
        s.player.hp = 3.0;
        s.shots.push(EnemyProjectile {
            pos: s.player.pos,
            vel: Vec2::ZERO,
            radius: 4.0,
            damage: 6.0,
            life: 1.0,
        });
        s.update_projectiles(DT, &mut events);
        assert!(s.shots.is_empty());
        assert_eq!(s.player.hp, 1.0);
        assert!(!s.game_over);
    }

    #[test]
    fn test_projectiles_expire() {
        let mut s = state();
        let mut events = Vec::new();
        s.shots.push(EnemyProjectile {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::new(1.0, 0.0),
            radius: 4.0,
            damage: 6.0,
            life: 0.01,
        });
        s.shots.push(EnemyProjectile {
            pos: Vec2::new(1999.0, 10.0),
            vel: Vec2::new(240.0, 0.0),
            radius: 4.0,
            damage: 6.0,
            life: 2.0,
        });
        s.update_projectiles(DT, &mut events);
        assert!(s.shots.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_orb_pickup_radius_includes_magnet() {
        let mut s = state();
        let p = s.player.pos;
        // pickup radius 10 + 10 + 0 + orb 6 = 26
        s.orbs.push(XpOrb {
            pos: p + Vec2::new(26.0, 0.0),
            radius: 6.0,
            value: 5.0,
        });
        s.orbs.push(XpOrb {
            pos: p + Vec2::new(60.0, 0.0),
            radius: 6.0,
            value: 5.0,
        });
        s.update_xp_orbs();
        assert_eq!(s.orbs.len(), 1);
        assert_eq!(s.player.xp, 5.0);

        s.player.xp_magnet = 40.0;
        s.update_xp_orbs();
        assert!(s.orbs.is_empty());
        assert_eq!(s.stats.xp_collected, 10.0);
    }

    #[test]
    fn test_weapon_pickup_switches_weapon() {
        let mut s = state();
        let mut events = Vec::new();
        s.drops.push(WeaponDrop {
            pos: s.player.pos,
            radius: 8.0,
            kind: WeaponKind::Spear,
        });
        s.update_weapon_drops(&mut events);
        assert_eq!(s.player.weapon, WeaponKind::Spear);
        assert_eq!(s.stats.weapons_collected, 1);
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut s = state();
        s.shake.timer = s.config.hit_shake_duration;
        s.update_shake(DT);
        assert!(s.shake.phase > 0.0);
        for _ in 0..20 {
            s.update_shake(DT);
        }
        assert_eq!(s.shake.timer, 0.0);
        assert_eq!(s.shake.offset, Vec2::ZERO);
    }

    #[test]
    fn test_level_up_queues_choices_and_opens_menu() {
        let mut s = state();
        let mut events = Vec::new();
        s.player.hp = 50.0;
        // 25 for level 2 plus 32 for level 3
        s.player.xp = 60.0;
        s.update_level_up(&mut events);

        assert_eq!(s.player.level, 3);
        assert!((s.player.xp - 3.0).abs() < 1e-3);
        assert_eq!(s.upgrade.pending, 2);
        assert!(s.upgrade.active);
        assert_eq!(s.player.hp, 80.0);
        assert_eq!(s.player.max_hp, 130.0);
        assert_eq!(events.len(), 2);

        // Menu open: further XP waits
        s.player.xp = 1000.0;
        s.update_level_up(&mut events);
        assert_eq!(s.player.level, 3);
    }

    #[test]
    fn test_enemies_follow_intent_or_chase() {
        let mut s = state();
        let p = s.player.pos;
        let a = place_enemy(&mut s, EnemyKind::Normal, p + Vec2::new(-100.0, 0.0));
        place_enemy(&mut s, EnemyKind::Normal, p + Vec2::new(0.0, -100.0));

        let mut intents = IntentMap::new();
        intents.insert(
            a,
            EnemyIntent {
                enemy_id: a,
                dir: Vec2::new(0.0, 1.0),
                speed_scale: 9.0,
                preferred_range: 65.0,
                mode: crate::jobs::IntentMode::Pursue,
            },
        );
        s.update_enemies(0.1, &intents);

        // Intent moves straight down, speed scale clamped to 1.5
        assert!((s.enemies[0].pos.y - (p.y + 18.0)).abs() < 1e-3);
        // No intent: chase toward the player
        assert!((s.enemies[1].pos.y - (p.y - 88.0)).abs() < 1e-3);
    }
}
