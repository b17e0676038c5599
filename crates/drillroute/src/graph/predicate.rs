use std::f64::consts::PI;

use crate::geom::{wrap_angle, BlockedGeometry, Pose};

use super::PoseType;

/// Thresholds of the pairwise edge test.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeCfg {
    /// Longest straight connection.
    pub max_separation: f64,
    pub max_heading_change: f64,
    /// Heading change allowed against the lateral side of the offset.
    pub lateral_tolerance: f64,
    /// Allow direct hole-to-hole edges.
    pub connect_holes: bool,
    pub turning_radius: f64,
}

impl Default for EdgeCfg {
    fn default() -> Self {
        Self {
            max_separation: 8.0,
            max_heading_change: 0.6 * PI,
            lateral_tolerance: 15f64.to_radians(),
            connect_holes: false,
            turning_radius: 3.0,
        }
    }
}

/// Offset of `other` seen from `frame` must agree with the turn `delta`
/// (heading of `other` minus heading of `frame`, wrapped).
fn directional_ok(frame: &Pose, other: &Pose, delta: f64, r: f64, tol: f64) -> bool {
    let o = frame.to_local(other.position());
    if o.y.abs() > r && o.x.abs() < r {
        return false;
    }
    let side = o.x * o.y;
    !((side > 0.0 && delta < -tol) || (side < 0.0 && delta > tol))
}

/// Can a vehicle drive straight from `a` to `b` (or back) given both headings?
///
/// Symmetric in its two poses: every test is either symmetric or applied
/// from both ends.
pub fn should_connect(
    a: &Pose,
    b: &Pose,
    kind_a: PoseType,
    kind_b: PoseType,
    blocked: &BlockedGeometry,
    cfg: &EdgeCfg,
) -> bool {
    if a == b {
        return true;
    }
    if !cfg.connect_holes && kind_a == PoseType::Hole && kind_b == PoseType::Hole {
        return false;
    }
    let (pa, pb) = (a.position(), b.position());
    let length = (pa - pb).norm();
    if length > cfg.max_separation {
        return false;
    }
    let r = cfg.turning_radius;
    let delta = wrap_angle(a.theta - b.theta);
    if delta.abs() > cfg.max_heading_change {
        return false;
    }
    if length < 2.0 * r * (delta.abs() / 2.0).sin() {
        return false;
    }

    let (al, ar) = (a.left_center(r), a.right_center(r));
    let (bl, br) = (b.left_center(r), b.right_center(r));
    if [(pb, al), (pb, ar), (pa, bl), (pa, br)]
        .iter()
        .any(|(p, c)| (p - c).norm() < r)
    {
        return false;
    }
    if (bl - ar).norm() < 2.0 * r || (br - al).norm() < 2.0 * r {
        return false;
    }

    let back = wrap_angle(b.theta - a.theta);
    if !directional_ok(b, a, delta, r, cfg.lateral_tolerance)
        || !directional_ok(a, b, back, r, cfg.lateral_tolerance)
    {
        return false;
    }

    // Fixed endpoint order keeps the floating-point test symmetric.
    let (s, t) = if (pa.x, pa.y) <= (pb.x, pb.y) {
        (pa, pb)
    } else {
        (pb, pa)
    };
    !blocked.intersects_segment(s, t)
}

/// Cost of the edge between two poses: distance, plus twice the angle between
/// the headings as unit rotations (half-angle quaternion form), plus a fixed
/// per-edge bias.
pub fn edge_weight(a: &Pose, b: &Pose) -> f64 {
    let (sa, ca) = (a.theta / 2.0).sin_cos();
    let (sb, cb) = (b.theta / 2.0).sin_cos();
    let dot = (ca * cb + sa * sb).abs().min(1.0);
    (a.position() - b.position()).norm() + 2.0 * dot.acos() + EDGE_BIAS
}

/// Constant added to every edge weight.
pub const EDGE_BIAS: f64 = 1.1;
