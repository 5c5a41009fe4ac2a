//! 2D math helpers shared by the gameplay passes and the AI workers
//!
//! `glam::Vec2` supplies add/sub/scale/length. Normalization always goes
//! through `normalize_or_zero` so a zero vector never turns into NaN.

pub use glam::Vec2;

/// World bounds `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a position into the world rectangle
    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x.clamp(0.0, self.width), pos.y.clamp(0.0, self.height))
    }

    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }
}

/// Squared distance between two points
#[inline]
pub fn dist2(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// Strict overlap test between two circles
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let rr = ra + rb;
    dist2(a, b) < rr * rr
}

/// Unit vector pointing along `angle` (radians)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Linear blend of two directions: `a * (1 - weight) + b * weight`
#[inline]
pub fn blend(a: Vec2, b: Vec2, weight: f32) -> Vec2 {
    a * (1.0 - weight) + b * weight
}
