use serde::{Deserialize, Serialize};

use super::{Polygon, Pose, Vec2};

/// Rectangular vehicle extent in the pose frame (x forward, y left).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub back: f64,
    pub front: f64,
    pub left: f64,
    pub right: f64,
}

impl Footprint {
    /// Body footprint checked against holes and low obstacles.
    pub const LOW: Footprint = Footprint {
        back: -3.5,
        front: 3.5,
        left: 1.8,
        right: -1.8,
    };

    /// Body plus the forward overhang (mast/primer), checked against high obstacles.
    pub const HIGH: Footprint = Footprint {
        back: -3.5,
        front: 6.5,
        left: 1.8,
        right: -1.8,
    };

    /// Footprint polygon placed at `pose`, vertices in CCW order.
    pub fn at(&self, pose: &Pose) -> Polygon {
        let (s, c) = pose.theta.sin_cos();
        let place =
            |fx: f64, fy: f64| Vec2::new(pose.x + c * fx - s * fy, pose.y + s * fx + c * fy);
        Polygon::new(vec![
            place(self.back, self.right),
            place(self.front, self.right),
            place(self.front, self.left),
            place(self.back, self.left),
        ])
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::LOW
    }
}
