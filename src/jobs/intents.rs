//! Enemy movement intents
//!
//! [`compute_intents`] is a pure function of its request. The worker pool
//! runs it off-thread and the scheduler runs it inline as the fallback, so
//! both paths always agree.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Behavior role the AI sees for an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyRole {
    Normal,
    Runner,
    Tank,
}

/// What an enemy is trying to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentMode {
    Pursue,
    Strafe,
    Kite,
    Pressure,
    Hold,
}

/// Minimum and maximum speed scale an intent may carry
pub const SPEED_SCALE_MIN: f32 = 0.2;
pub const SPEED_SCALE_MAX: f32 = 1.5;

/// Enemy as seen by the AI at submission time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub enemy_id: u32,
    pub role: EnemyRole,
    pub pos: Vec2,
    pub radius: f32,
}

/// Input for one AI tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRequest {
    pub tick: u64,
    pub player_pos: Vec2,
    pub enemies: Vec<EnemySnapshot>,
}

/// Movement directive for a single enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyIntent {
    pub enemy_id: u32,
    /// Unit direction
    pub dir: Vec2,
    pub speed_scale: f32,
    pub preferred_range: f32,
    pub mode: IntentMode,
}

/// Output for one AI tick; intents are keyed by enemy ID, not position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub tick: u64,
    pub intents: Vec<EnemyIntent>,
}

/// Per-role tuning resolved from the distance to the player
struct Steering {
    mode: IntentMode,
    preferred: f32,
    speed_scale: f32,
    sep_weight: f32,
    base: Vec2,
}

fn steer(role: EnemyRole, enemy_id: u32, chase: Vec2, dist: f32) -> Steering {
    match role {
        EnemyRole::Runner => {
            let tangent = perpendicular(chase, enemy_id);
            let (mode, speed_scale, base) = if dist > 190.0 {
                // Weave in from afar
                (IntentMode::Pursue, 1.20, blend(chase, tangent, 0.15))
            } else if dist > 95.0 {
                (IntentMode::Strafe, 1.10, blend(chase, tangent, 0.55))
            } else {
                (IntentMode::Kite, 1.28, blend(-chase, tangent, 0.65))
            };
            Steering {
                mode,
                preferred: 110.0,
                speed_scale,
                sep_weight: 0.2,
                base,
            }
        }
        EnemyRole::Tank => {
            let (mode, speed_scale) = if dist > 150.0 {
                (IntentMode::Pressure, 0.95)
            } else if dist > 80.0 {
                (IntentMode::Pressure, 0.75)
            } else {
                (IntentMode::Hold, 0.42)
            };
            Steering {
                mode,
                preferred: 45.0,
                speed_scale,
                sep_weight: 0.55,
                base: chase,
            }
        }
        EnemyRole::Normal => {
            let (mode, speed_scale) = if dist < 80.0 {
                (IntentMode::Pressure, 0.85)
            } else {
                (IntentMode::Pursue, 1.0)
            };
            Steering {
                mode,
                preferred: 65.0,
                speed_scale,
                sep_weight: 0.32,
                base: chase,
            }
        }
    }
}

/// Compute one intent per enemy in `req`, in request order
pub fn compute_intents(req: &IntentRequest) -> IntentResult {
    let intents = req
        .enemies
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let to_player = req.player_pos - e.pos;
            let dist = to_player.length();
            let mut chase = to_player.normalize_or_zero();
            if chase == Vec2::ZERO {
                chase = fallback_direction(e.enemy_id);
            }

            let sep_radius = (e.radius * 3.2).max(24.0);
            let sep = separation(&req.enemies, i, sep_radius);

            let s = steer(e.role, e.enemy_id, chase, dist);

            let mut dir = (s.base + sep * s.sep_weight).normalize_or_zero();
            if dir == Vec2::ZERO {
                dir = s.base.normalize_or_zero();
            }
            if dir == Vec2::ZERO {
                dir = fallback_direction(e.enemy_id);
            }

            EnemyIntent {
                enemy_id: e.enemy_id,
                dir,
                speed_scale: s.speed_scale.clamp(SPEED_SCALE_MIN, SPEED_SCALE_MAX),
                preferred_range: s.preferred,
                mode: s.mode,
            }
        })
        .collect();

    IntentResult {
        tick: req.tick,
        intents,
    }
}

/// Inverse-distance weighted push away from neighbours within `radius`
fn separation(enemies: &[EnemySnapshot], self_idx: usize, radius: f32) -> Vec2 {
    let me = enemies[self_idx].pos;
    let r2 = radius * radius;

    let push = enemies
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != self_idx)
        .fold(Vec2::ZERO, |acc, (_, other)| {
            let d = me - other.pos;
            let d2 = d.length_squared();
            if d2 == 0.0 || d2 > r2 {
                return acc;
            }
            let weight = 1.0 - d2 / r2;
            acc + d / d2.sqrt() * weight
        });

    push.normalize_or_zero()
}

fn blend(a: Vec2, b: Vec2, b_weight: f32) -> Vec2 {
    crate::sim::math::blend(a, b, b_weight)
}

/// Tangent whose handedness depends on the enemy ID so neighbours weave apart
fn perpendicular(v: Vec2, enemy_id: u32) -> Vec2 {
    if enemy_id % 2 == 0 {
        Vec2::new(-v.y, v.x)
    } else {
        Vec2::new(v.y, -v.x)
    }
}

/// Deterministic direction for degenerate cases (exact overlap)
fn fallback_direction(enemy_id: u32) -> Vec2 {
    if enemy_id % 2 == 0 { Vec2::X } else { Vec2::Y }
}
