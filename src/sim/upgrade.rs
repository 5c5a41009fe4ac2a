//! Level-up upgrade menu

use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use super::state::Player;
use crate::tuning::Config;

/// Upgrades that can be offered on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpgradeKind {
    #[default]
    Damage,
    AttackSpeed,
    Vitality,
    Magnet,
    Reach,
    Swiftness,
}

/// Offer pool; order matters for the RNG-driven selection
pub const UPGRADE_POOL: [UpgradeKind; 6] = [
    UpgradeKind::Damage,
    UpgradeKind::AttackSpeed,
    UpgradeKind::Vitality,
    UpgradeKind::Magnet,
    UpgradeKind::Reach,
    UpgradeKind::Swiftness,
];

impl UpgradeKind {
    fn name(self) -> &'static str {
        match self {
            UpgradeKind::Damage => "+Damage",
            UpgradeKind::AttackSpeed => "Faster Attack",
            UpgradeKind::Vitality => "Vitality",
            UpgradeKind::Magnet => "Magnet",
            UpgradeKind::Reach => "Reach",
            UpgradeKind::Swiftness => "Swiftness",
        }
    }

    fn description(self, cfg: &Config) -> String {
        match self {
            UpgradeKind::Damage => format!("Increase damage by +{:.0}", cfg.upgrade_damage),
            UpgradeKind::AttackSpeed => format!(
                "Reduce attack cooldown by {:.0}%",
                (1.0 - cfg.upgrade_cooldown_factor) * 100.0
            ),
            UpgradeKind::Vitality => {
                format!("+{:.0} max health and heal the same", cfg.upgrade_max_hp)
            }
            UpgradeKind::Magnet => format!("+{:.0} XP pickup radius", cfg.upgrade_magnet),
            UpgradeKind::Reach => format!("+{:.0} attack range", cfg.upgrade_range),
            UpgradeKind::Swiftness => format!(
                "Move {:.0}% faster",
                (cfg.upgrade_speed_factor - 1.0) * 100.0
            ),
        }
    }

    /// Apply this upgrade to the player
    pub fn apply(self, player: &mut Player, cfg: &Config) {
        match self {
            UpgradeKind::Damage => player.damage += cfg.upgrade_damage,
            UpgradeKind::AttackSpeed => {
                // Lower cooldown means faster attacks; never reaches zero
                player.attack_cooldown = (player.attack_cooldown * cfg.upgrade_cooldown_factor)
                    .max(cfg.upgrade_min_cooldown);
                player.attack_timer = player.attack_timer.min(player.attack_cooldown);
            }
            UpgradeKind::Vitality => {
                player.max_hp += cfg.upgrade_max_hp;
                player.hp = (player.hp + cfg.upgrade_max_hp).min(player.max_hp);
            }
            UpgradeKind::Magnet => player.xp_magnet += cfg.upgrade_magnet,
            UpgradeKind::Reach => player.attack_range += cfg.upgrade_range,
            UpgradeKind::Swiftness => player.speed *= cfg.upgrade_speed_factor,
        }
    }
}

/// One entry in the upgrade menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeOption {
    pub kind: UpgradeKind,
    pub title: String,
    pub description: String,
}

/// Upgrade menu state. While `active`, gameplay passes do not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeMenu {
    pub active: bool,
    pub options: [UpgradeOption; 2],
    /// Level-ups not yet resolved by a choice
    pub pending: u32,
}

impl UpgradeMenu {
    /// Open the menu with two fresh offers if choices are pending.
    /// Draws two values from `rng` when it opens.
    pub fn open_if_needed(&mut self, cfg: &Config, rng: &mut SimRng) {
        if self.pending == 0 || self.active {
            return;
        }

        let first = rng.below(UPGRADE_POOL.len() as u32) as usize;
        // Pick from the remaining kinds so the two offers are distinct
        let mut second = rng.below(UPGRADE_POOL.len() as u32 - 1) as usize;
        if second >= first {
            second += 1;
        }

        for (slot, pick) in [first, second].into_iter().enumerate() {
            let kind = UPGRADE_POOL[pick];
            self.options[slot] = UpgradeOption {
                kind,
                title: format!("{}) {}", slot + 1, kind.name()),
                description: kind.description(cfg),
            };
        }
        self.active = true;
    }

    /// Resolve one pending level-up with option `choice` (0 or 1).
    /// Out-of-range choices and choices while the menu is closed are ignored.
    pub fn choose(
        &mut self,
        choice: usize,
        player: &mut Player,
        cfg: &Config,
        rng: &mut SimRng,
    ) -> Option<UpgradeKind> {
        if !self.active || choice >= self.options.len() {
            return None;
        }

        let kind = self.options[choice].kind;
        kind.apply(player, cfg);

        self.pending = self.pending.saturating_sub(1);
        self.active = false;
        // More levels queued (big XP pickup): offer again
        self.open_if_needed(cfg, rng);
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn player(cfg: &Config) -> Player {
        Player::new(Vec2::new(50.0, 50.0), cfg)
    }

    #[test]
    fn test_menu_offers_two_distinct_options() {
        let cfg = Config::default();
        for seed in 1..50 {
            let mut rng = SimRng::new(seed);
            let mut menu = UpgradeMenu {
                pending: 1,
                ..Default::default()
            };
            menu.open_if_needed(&cfg, &mut rng);
            assert!(menu.active);
            assert_ne!(menu.options[0].kind, menu.options[1].kind);
            assert!(menu.options[0].title.starts_with("1) "));
            assert!(menu.options[1].title.starts_with("2) "));
            assert_eq!(rng.draws(), 2);
        }
    }

    #[test]
    fn test_closed_menu_ignores_choice() {
        let cfg = Config::default();
        let mut rng = SimRng::new(1);
        let mut p = player(&cfg);
        let mut menu = UpgradeMenu::default();
        assert_eq!(menu.choose(0, &mut p, &cfg, &mut rng), None);
        assert_eq!(p, player(&cfg));
    }

    #[test]
    fn test_out_of_range_choice_ignored() {
        let cfg = Config::default();
        let mut rng = SimRng::new(1);
        let mut p = player(&cfg);
        let mut menu = UpgradeMenu {
            pending: 1,
            ..Default::default()
        };
        menu.open_if_needed(&cfg, &mut rng);
        assert_eq!(menu.choose(2, &mut p, &cfg, &mut rng), None);
        assert!(menu.active);
        assert_eq!(menu.pending, 1);
    }

    #[test]
    fn test_pending_choices_reopen_menu() {
        let cfg = Config::default();
        let mut rng = SimRng::new(3);
        let mut p = player(&cfg);
        let mut menu = UpgradeMenu {
            pending: 2,
            ..Default::default()
        };
        menu.open_if_needed(&cfg, &mut rng);

        assert!(menu.choose(1, &mut p, &cfg, &mut rng).is_some());
        assert!(menu.active);
        assert_eq!(menu.pending, 1);

        assert!(menu.choose(0, &mut p, &cfg, &mut rng).is_some());
        assert!(!menu.active);
        assert_eq!(menu.pending, 0);
    }

    #[test]
    fn test_attack_speed_floor() {
        let cfg = Config::default();
        let mut p = player(&cfg);
        p.attack_timer = 0.4;
        for _ in 0..40 {
            UpgradeKind::AttackSpeed.apply(&mut p, &cfg);
        }
        assert!((p.attack_cooldown - cfg.upgrade_min_cooldown).abs() < 1e-6);
        assert!(p.attack_timer <= p.attack_cooldown);
    }
}
