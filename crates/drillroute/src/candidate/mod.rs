//! Approach manoeuvres from a street pose to a drill hole.
//!
//! Purpose
//! - From a pose on a street, find a drivable path that turns toward a hole
//!   and stops at the hole's clearance distance, facing the hole.
//!
//! How
//! - Of the two turning circles tangent to the approach heading, take the
//!   centre nearest the hole. That circle and the two tangent lines from the
//!   hole bound a teardrop whose boundary, read from the approach point, is
//!   "turn on the circle, then drive straight at the hole".
//! - The teardrop boundary is cut by the segment joining both turning
//!   centres (it crosses the ring at the approach point) and by the
//!   clearance circle around the hole. The piece leaving the approach point
//!   along the current heading is the manoeuvre.
//! - The arcs are polygons whose first vertex is the approach point, so the
//!   ring seam sits exactly there (see `ring`). The tangent points are exact.
//!
//! Rejections (`None`): hole inside the turning circle; approach point not on
//! the teardrop; no piece leaves along the heading; end still on the turning
//! circle; end heading reversed; path meets the blocked area.

mod ring;

pub use ring::{circle_crossings, segment_crossings, split_ring};

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::geom::{angle_of, wrap_angle, BlockedGeometry, Polyline, Pose, Vec2};

/// Tolerances and sampling of the manoeuvre construction.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateCfg {
    /// Vertices of the turning-circle polygon.
    pub circle_vertices: usize,
    /// Cuts closer than this (arc length) to the seam or to each other merge.
    pub endpoint_tolerance: f64,
    /// Arc length used to estimate tangent directions.
    pub tangent_step: f64,
    pub start_heading_tolerance: f64,
    /// Reject manoeuvres ending with a heading this far from the approach (`None` disables).
    pub end_heading_tolerance: Option<f64>,
    /// Extra radius when checking whether the end left the turning circle.
    pub turning_margin: f64,
    /// Spacing of the emitted poses along the manoeuvre.
    pub resample_step: f64,
}

impl Default for CandidateCfg {
    fn default() -> Self {
        Self {
            circle_vertices: 64,
            endpoint_tolerance: 0.01,
            tangent_step: 0.1,
            start_heading_tolerance: FRAC_PI_4,
            end_heading_tolerance: Some(FRAC_PI_2),
            turning_margin: 0.001,
            resample_step: 3.0,
        }
    }
}

/// A feasible approach: poses along it (last one faces the hole), its
/// clearance to the blocked area and its length.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub poses: Vec<Pose>,
    pub clearance: f64,
    pub length: f64,
}

/// Teardrop ring around the turning circle at `center` and the `target`,
/// starting and ending at `start` (which lies on the circle).
///
/// Counter-clockwise: along the circle to the first tangent point, straight
/// to the target and back to the second tangent point, then along the circle
/// to `start`. Arc vertices sit every `TAU / n` from `start`; the tangent
/// points are exact. `None` if the target is not outside the circle or
/// `start` lies on the arc hidden behind the two tangents.
fn envelope_ring(
    start: Vec2,
    center: Vec2,
    radius: f64,
    target: Vec2,
    n: usize,
) -> Option<Polyline> {
    let to_target = target - center;
    let dist = to_target.norm();
    if dist <= radius {
        return None;
    }
    let beta = angle_of(to_target);
    let alpha = (radius / dist).acos();
    let phi0 = angle_of(start - center);
    // Counter-clockwise sweeps start -> first tangent and second tangent -> start.
    let before = (beta - alpha - phi0).rem_euclid(TAU);
    let after = (phi0 - beta - alpha).rem_euclid(TAU);
    if before + 2.0 * alpha + after > TAU + 1e-9 {
        return None;
    }

    let n = n.max(3);
    let step = TAU / n as f64;
    let on_circle = |phi: f64| center + Vec2::new(phi.cos(), phi.sin()) * radius;
    let first_hidden = (before / step).ceil() as usize;
    let first_back = ((TAU - after) / step).floor() as usize + 1;

    let mut pts = Vec::with_capacity(n + 4);
    pts.push(start);
    pts.extend((1..first_hidden).map(|k| on_circle(phi0 + step * k as f64)));
    pts.push(on_circle(beta - alpha));
    pts.push(target);
    pts.push(on_circle(beta + alpha));
    pts.extend((first_back..n).map(|k| on_circle(phi0 + step * k as f64)));
    pts.push(start);
    Some(Polyline::new(pts))
}

fn heading_error(line: &Polyline, from: f64, toward: f64, reference: f64) -> f64 {
    let a = line.interpolate(from);
    let b = line.interpolate(toward);
    wrap_angle(angle_of(b - a) - reference).abs()
}

/// Build the approach manoeuvre from `approach` to `target`.
///
/// `blocked` must already exclude the target's own disk.
pub fn generate(
    approach: &Pose,
    target: Vec2,
    blocked: &BlockedGeometry,
    turning_radius: f64,
    clearance_radius: f64,
    cfg: &CandidateCfg,
) -> Option<Candidate> {
    let start = approach.position();
    let centers = [
        approach.left_center(turning_radius),
        approach.right_center(turning_radius),
    ];
    let (center, other) = if (centers[0] - target).norm() <= (centers[1] - target).norm() {
        (centers[0], centers[1])
    } else {
        (centers[1], centers[0])
    };
    if (center - target).norm() < turning_radius {
        return None;
    }

    let ring = envelope_ring(start, center, turning_radius, target, cfg.circle_vertices)?;
    let total = ring.length();
    let mut cuts = segment_crossings(&ring, center, other);
    cuts.extend(circle_crossings(&ring, target, clearance_radius));
    let pieces = split_ring(total, &cuts, cfg.endpoint_tolerance);

    let (step, start_tol) = (cfg.tangent_step, cfg.start_heading_tolerance);
    let trajectory = pieces.iter().find_map(|&(s0, s1)| {
        let piece = ring.substring(s0, s1);
        let len = s1 - s0;
        if s0 == 0.0 && heading_error(&piece, 0.0, step, approach.theta) < start_tol {
            return Some(piece);
        }
        if s1 == total && heading_error(&piece, len, len - step, approach.theta) < start_tol {
            return Some(piece.reversed());
        }
        None
    })?;

    let length = trajectory.length();
    let end = trajectory.interpolate(length);
    if (end - center).norm() <= turning_radius + cfg.turning_margin {
        return None;
    }
    if let Some(tol) = cfg.end_heading_tolerance {
        if heading_error(&trajectory, length - step, length, approach.theta) > tol {
            return None;
        }
    }
    if blocked.intersects_polyline(&trajectory) {
        return None;
    }

    let spacing = cfg.resample_step;
    let inner = if spacing > 0.0 {
        (length / spacing).ceil() as usize
    } else {
        0
    };
    let mut poses: Vec<Pose> = (1..inner)
        .map(|k| {
            let l = spacing * k as f64;
            let p = trajectory.interpolate(l);
            Pose::at(p, angle_of(trajectory.interpolate(l + step) - p))
        })
        .collect();
    poses.push(Pose::from_heading_line(end, target));

    Some(Candidate {
        poses,
        clearance: blocked.distance_to_polyline(&trajectory),
        length,
    })
}

#[cfg(test)]
mod tests;
