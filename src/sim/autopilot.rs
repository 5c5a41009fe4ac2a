//! Idle/demo mode input
//!
//! Produces a [`FrameInput`] from the current state without touching the RNG,
//! so runs driven by the autopilot stay reproducible and can be recorded like
//! any other input.

use glam::Vec2;

use super::command::{FrameInput, InputState};
use super::state::SimState;

/// Enemies closer than this are avoided before anything else
const DANGER_RADIUS: f32 = 150.0;
/// Keep this far from the walls when fleeing
const WALL_MARGIN: f32 = 60.0;

pub fn autopilot_frame(state: &SimState) -> FrameInput {
    if state.upgrade.active {
        return FrameInput {
            choose: Some(0),
            ..Default::default()
        };
    }

    let p = state.player.pos;

    let threat = state
        .enemies
        .iter()
        .map(|e| (e.pos.distance_squared(p), e.pos))
        .filter(|(d2, _)| *d2 < DANGER_RADIUS * DANGER_RADIUS)
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let mut want = match threat {
        Some((_, enemy)) => p - enemy,
        None => state
            .orbs
            .iter()
            .map(|o| o.pos)
            .chain(state.drops.iter().map(|d| d.pos))
            .min_by(|a, b| a.distance_squared(p).total_cmp(&b.distance_squared(p)))
            .map(|target| target - p)
            .unwrap_or(Vec2::ZERO),
    };

    // Cornered: slide along the wall toward the middle instead
    let bounds = state.bounds();
    if p.x < WALL_MARGIN || p.x > bounds.width - WALL_MARGIN {
        want.x = bounds.center().x - p.x;
    }
    if p.y < WALL_MARGIN || p.y > bounds.height - WALL_MARGIN {
        want.y = bounds.center().y - p.y;
    }

    FrameInput {
        input: to_keys(want),
        ..Default::default()
    }
}

/// Quantize a desired direction onto the four movement keys
fn to_keys(dir: Vec2) -> InputState {
    let dead = 0.35 * dir.length();
    InputState {
        up: dir.y < -dead,
        down: dir.y > dead,
        left: dir.x < -dead,
        right: dir.x > dead,
    }
}
