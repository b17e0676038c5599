//! Rigid 2D frames: translate/rotate and the principal-axis frame of a point set.

use nalgebra::{Matrix2, SymmetricEigen};

use super::Vec2;

/// Translate every point by `(tx, ty)`.
pub fn translate(points: &[Vec2], tx: f64, ty: f64) -> Vec<Vec2> {
    let t = Vec2::new(tx, ty);
    points.iter().map(|p| p + t).collect()
}

/// Rotate every point about the origin by `angle` (counter-clockwise).
pub fn rotate(points: &[Vec2], angle: f64) -> Vec<Vec2> {
    let (s, c) = angle.sin_cos();
    points
        .iter()
        .map(|p| Vec2::new(c * p.x - s * p.y, s * p.x + c * p.y))
        .collect()
}

/// Local frame with `origin` mapped to zero and direction `angle` mapped to +x.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub origin: Vec2,
    pub angle: f64,
}

impl Frame {
    pub fn identity() -> Self {
        Self {
            origin: Vec2::zeros(),
            angle: 0.0,
        }
    }

    /// Centroid and dominant axis (largest eigenvector of the covariance) of `points`.
    ///
    /// Returns `None` for an empty set. A degenerate set (all points equal) yields
    /// an arbitrary but finite axis.
    pub fn principal(points: &[Vec2]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let origin = points.iter().fold(Vec2::zeros(), |acc, p| acc + p) / n;
        let mut cov = Matrix2::zeros();
        for p in points {
            let d = p - origin;
            cov += d * d.transpose();
        }
        cov /= n;
        let eig = SymmetricEigen::new(cov);
        let k = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            0
        } else {
            1
        };
        let axis = eig.eigenvectors.column(k);
        let angle = axis[1].atan2(axis[0]);
        if !origin.iter().all(|v| v.is_finite()) || !angle.is_finite() {
            return None;
        }
        Some(Self { origin, angle })
    }

    /// World → local: `rotate(translate(p, -origin), -angle)`.
    pub fn to_local(&self, points: &[Vec2]) -> Vec<Vec2> {
        rotate(
            &translate(points, -self.origin.x, -self.origin.y),
            -self.angle,
        )
    }

    /// Local → world: inverse of [`Frame::to_local`].
    pub fn to_world(&self, points: &[Vec2]) -> Vec<Vec2> {
        translate(&rotate(points, self.angle), self.origin.x, self.origin.y)
    }
}
