//! Vehicle pose and angle helpers.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::Vec2;

/// Wrap an angle to `(-π, π]`.
#[inline]
pub fn wrap_angle(a: f64) -> f64 {
    if !a.is_finite() {
        return a;
    }
    let mut w = a % TAU;
    if w <= -PI {
        w += TAU;
    } else if w > PI {
        w -= TAU;
    }
    w
}

/// Direction of `v` as an angle in `(-π, π]`.
#[inline]
pub fn angle_of(v: Vec2) -> f64 {
    v.y.atan2(v.x)
}

/// Planar vehicle state: position plus heading (radians, wrapped to `(-π, π]`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: wrap_angle(theta),
        }
    }

    #[inline]
    pub fn at(p: Vec2, theta: f64) -> Self {
        Self::new(p.x, p.y, theta)
    }

    /// Pose at `from` heading toward `toward` (home poses are given as two-point lines).
    pub fn from_heading_line(from: Vec2, toward: Vec2) -> Self {
        Self::at(from, angle_of(toward - from))
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Unit vector along the heading.
    #[inline]
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.theta.cos(), self.theta.sin())
    }

    /// Centre of the turning circle on the left (`+π/2`) side.
    #[inline]
    pub fn left_center(&self, radius: f64) -> Vec2 {
        self.offset_at(self.theta + PI / 2.0, radius)
    }

    /// Centre of the turning circle on the right (`-π/2`) side.
    #[inline]
    pub fn right_center(&self, radius: f64) -> Vec2 {
        self.offset_at(self.theta - PI / 2.0, radius)
    }

    #[inline]
    fn offset_at(&self, angle: f64, dist: f64) -> Vec2 {
        self.position() + Vec2::new(angle.cos(), angle.sin()) * dist
    }

    /// Express a world point in this pose's frame (x forward, y left).
    #[inline]
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        let d = p - self.position();
        let (s, c) = self.theta.sin_cos();
        Vec2::new(c * d.x + s * d.y, -s * d.x + c * d.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}
