//! Weapon archetypes and drop tables

use std::fmt;

use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use super::state::EnemyKind;

/// Weapons the player can wield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Whip,
    Spear,
    Nova,
    Fang,
}

/// How an attack picks its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStyle {
    /// Nearest enemy in range
    Single,
    /// Nearest few enemies in range, all hit at once
    Pierce,
    /// Every enemy inside a radius around the player, up to a limit
    Radial,
}

/// Static weapon definition
#[derive(Debug, Clone, Copy)]
pub struct WeaponDef {
    pub name: &'static str,
    pub style: AttackStyle,
    pub damage_mul: f32,
    pub cooldown_mul: f32,
    pub range_mul: f32,
    /// Radius for radial attacks (ignores range)
    pub attack_radius: f32,
    /// Maximum enemies hit by one attack
    pub max_targets: usize,
    pub drop_weight: u32,
    pub drop_radius: f32,
}

/// Drop roll order; must stay stable for replays
pub const WEAPON_ORDER: [WeaponKind; 4] = [
    WeaponKind::Whip,
    WeaponKind::Spear,
    WeaponKind::Nova,
    WeaponKind::Fang,
];

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().name)
    }
}

impl WeaponKind {
    pub fn def(self) -> WeaponDef {
        match self {
            WeaponKind::Whip => WeaponDef {
                name: "Whip",
                style: AttackStyle::Single,
                damage_mul: 1.00,
                cooldown_mul: 1.00,
                range_mul: 1.00,
                attack_radius: 0.0,
                max_targets: 1,
                drop_weight: 30,
                drop_radius: 9.0,
            },
            WeaponKind::Spear => WeaponDef {
                name: "Spear",
                style: AttackStyle::Pierce,
                damage_mul: 0.85,
                cooldown_mul: 0.85,
                range_mul: 1.15,
                attack_radius: 0.0,
                max_targets: 3,
                drop_weight: 26,
                drop_radius: 8.0,
            },
            WeaponKind::Nova => WeaponDef {
                name: "Blood Nova",
                style: AttackStyle::Radial,
                damage_mul: 0.70,
                cooldown_mul: 1.20,
                range_mul: 0.90,
                attack_radius: 135.0,
                max_targets: 12,
                drop_weight: 16,
                drop_radius: 11.0,
            },
            WeaponKind::Fang => WeaponDef {
                name: "Fang Dagger",
                style: AttackStyle::Single,
                damage_mul: 1.35,
                cooldown_mul: 1.30,
                range_mul: 0.80,
                attack_radius: 0.0,
                max_targets: 1,
                drop_weight: 22,
                drop_radius: 7.0,
            },
        }
    }

    /// Asset lookup key for the drop sprite
    pub fn sprite_key(self) -> &'static str {
        match self {
            WeaponKind::Whip => "weapon_whip",
            WeaponKind::Spear => "weapon_spear",
            WeaponKind::Nova => "weapon_nova",
            WeaponKind::Fang => "weapon_fang",
        }
    }
}

/// Chance that a killed enemy leaves a weapon drop
pub fn drop_chance(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Tank => 0.42,
        EnemyKind::Runner => 0.22,
        EnemyKind::Normal => 0.10,
    }
}

/// Weighted weapon roll (one RNG draw)
pub fn roll_weapon(rng: &mut SimRng) -> WeaponKind {
    let total: u32 = WEAPON_ORDER.iter().map(|k| k.def().drop_weight).sum();
    let roll = rng.below(total);
    let mut acc = 0;
    for kind in WEAPON_ORDER {
        acc += kind.def().drop_weight;
        if roll < acc {
            return kind;
        }
    }
    WeaponKind::Whip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_weapon_covers_all_kinds() {
        let mut rng = SimRng::new(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(roll_weapon(&mut rng));
        }
        assert_eq!(seen.len(), WEAPON_ORDER.len());
        assert_eq!(rng.draws(), 500);
    }

    #[test]
    fn test_display_uses_weapon_name() {
        assert_eq!(WeaponKind::Nova.to_string(), "Blood Nova");
        assert_eq!(WeaponKind::Fang.to_string(), "Fang Dagger");
    }

    #[test]
    fn test_only_nova_is_radial() {
        for kind in WEAPON_ORDER {
            let radial = kind.def().style == AttackStyle::Radial;
            assert_eq!(radial, kind == WeaponKind::Nova);
        }
    }
}
