//! Read-only view of the world for renderers
//!
//! Renderers never see `World` itself. They borrow a [`RenderView`] between
//! ticks and turn it into a draw list, asking an [`AssetProvider`] for a
//! sprite per string key and falling back to a flat primitive when the asset
//! is missing.

use glam::Vec2;

use crate::sim::state::{
    AttackFlash, Enemy, EnemyKind, EnemyProjectile, Player, RunPhase, SimState, Stats, WeaponDrop,
    XpOrb,
};
use crate::sim::upgrade::UpgradeMenu;

/// Sprite lookup by key
pub trait AssetProvider {
    type Handle;

    fn get(&self, key: &str) -> Option<&Self::Handle>;
}

/// Flat fallback shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: [f32; 4],
    },
}

#[derive(Debug, PartialEq)]
pub enum Drawable<'a, H> {
    Sprite {
        handle: &'a H,
        center: Vec2,
        radius: f32,
    },
    Primitive(Shape),
}

/// Sprite for `key` if the provider has it, otherwise a colored circle
pub fn resolve<'a, P: AssetProvider>(
    assets: &'a P,
    key: &str,
    center: Vec2,
    radius: f32,
    color: [f32; 4],
) -> Drawable<'a, P::Handle> {
    match assets.get(key) {
        Some(handle) => Drawable::Sprite {
            handle,
            center,
            radius,
        },
        None => Drawable::Primitive(Shape::Circle {
            center,
            radius,
            color,
        }),
    }
}

const PLAYER_COLOR: [f32; 4] = [0.85, 0.85, 0.95, 1.0];
const ORB_COLOR: [f32; 4] = [0.3, 0.9, 0.5, 1.0];
const DROP_COLOR: [f32; 4] = [0.95, 0.8, 0.3, 1.0];
const SHOT_COLOR: [f32; 4] = [1.0, 0.45, 0.2, 1.0];
const FLASH_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.6];

fn enemy_color(e: &Enemy) -> [f32; 4] {
    // Brighten while the hit flash is running
    let base = match e.kind {
        EnemyKind::Normal => [0.8, 0.2, 0.25, 1.0],
        EnemyKind::Runner => [0.9, 0.5, 0.2, 1.0],
        EnemyKind::Tank => [0.55, 0.15, 0.5, 1.0],
    };
    if e.hit_flash > 0.0 {
        [1.0, 1.0, 1.0, 1.0]
    } else {
        base
    }
}

#[derive(Clone, Copy)]
pub struct RenderView<'a> {
    state: &'a SimState,
}

impl<'a> RenderView<'a> {
    pub fn new(state: &'a SimState) -> Self {
        Self { state }
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.state.width, self.state.height)
    }

    pub fn player(&self) -> &'a Player {
        &self.state.player
    }

    pub fn enemies(&self) -> &'a [Enemy] {
        &self.state.enemies
    }

    pub fn orbs(&self) -> &'a [XpOrb] {
        &self.state.orbs
    }

    pub fn drops(&self) -> &'a [WeaponDrop] {
        &self.state.drops
    }

    pub fn shots(&self) -> &'a [EnemyProjectile] {
        &self.state.shots
    }

    pub fn stats(&self) -> &'a Stats {
        &self.state.stats
    }

    pub fn upgrade(&self) -> &'a UpgradeMenu {
        &self.state.upgrade
    }

    pub fn attack_flash(&self) -> &'a AttackFlash {
        &self.state.attack_flash
    }

    pub fn time_survived(&self) -> f32 {
        self.state.time_survived
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    /// Camera offset from screen shake
    pub fn shake_offset(&self) -> Vec2 {
        self.state.shake.offset
    }

    /// Everything to draw this frame, back to front
    pub fn draw_list<'b, P: AssetProvider>(&self, assets: &'b P) -> Vec<Drawable<'b, P::Handle>> {
        let s = self.state;
        let mut out = Vec::with_capacity(
            s.orbs.len() + s.drops.len() + s.enemies.len() + s.shots.len() + 2,
        );

        for orb in &s.orbs {
            out.push(resolve(assets, "xp_orb", orb.pos, orb.radius, ORB_COLOR));
        }
        for drop in &s.drops {
            out.push(resolve(
                assets,
                drop.kind.sprite_key(),
                drop.pos,
                drop.radius,
                DROP_COLOR,
            ));
        }
        for e in &s.enemies {
            out.push(resolve(assets, e.kind.sprite_key(), e.pos, e.radius, enemy_color(e)));
        }
        for shot in &s.shots {
            out.push(resolve(assets, "enemy_shot", shot.pos, shot.radius, SHOT_COLOR));
        }
        out.push(resolve(
            assets,
            "player",
            s.player.pos,
            s.player.radius,
            PLAYER_COLOR,
        ));

        let flash = &s.attack_flash;
        if flash.timer > 0.0 {
            // Radial attacks show their area, single hits a small spark
            let shape = if flash.radius > 0.0 {
                Shape::Ring {
                    center: flash.pos,
                    radius: flash.radius,
                    width: 3.0,
                    color: FLASH_COLOR,
                }
            } else {
                Shape::Circle {
                    center: flash.pos,
                    radius: 6.0,
                    color: FLASH_COLOR,
                }
            };
            out.push(Drawable::Primitive(shape));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Config;
    use std::collections::HashMap;

    struct Atlas(HashMap<String, u32>);

    impl AssetProvider for Atlas {
        type Handle = u32;

        fn get(&self, key: &str) -> Option<&u32> {
            self.0.get(key)
        }
    }

    #[test]
    fn test_missing_asset_falls_back_to_primitive() {
        let mut state = SimState::new(500.0, 500.0, Config::default(), 1);
        let id = state.next_enemy_id();
        state
            .enemies
            .push(Enemy::new(id, EnemyKind::Tank, Vec2::new(10.0, 10.0), &state.config));

        let atlas = Atlas(HashMap::from([("player".to_string(), 7)]));
        let view = RenderView::new(&state);
        let list = view.draw_list(&atlas);

        assert_eq!(list.len(), 2);
        assert!(matches!(list[0], Drawable::Primitive(Shape::Circle { radius, .. }) if radius == 14.0));
        assert!(matches!(list[1], Drawable::Sprite { handle, .. } if *handle == 7));
    }
}
