//! Street and transit-street discretisation into vehicle poses.
//!
//! Each segment is walked from its start in fixed steps; a step is emitted
//! while the remaining distance to the segment end exceeds the stop
//! tolerance, so the segment end itself is emitted by the next segment (or,
//! for the final vertex, once at the end of the feature with the heading of
//! the last segment). A pose is kept only if its body footprint misses the
//! low obstacles, its extended footprint misses the high obstacles, and the
//! extended footprint lies inside the geofence.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::geom::{angle_of, Footprint, Polygon, Polyline, Pose, Vec2};

/// Which kind of linear feature is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Street,
    /// Two-way lane: every kept pose also yields a mirrored, reversed pose
    /// shifted slightly to the left.
    Transit,
}

/// Obstacles relevant to pose sampling.
#[derive(Clone, Debug)]
pub struct SiteObstacles<'a> {
    pub geofence: &'a Polygon,
    pub low: &'a [Polygon],
    pub high: &'a [Polygon],
}

#[derive(Clone, Debug, PartialEq)]
pub struct SamplerCfg {
    pub spacing: f64,
    /// Stop stepping along a segment once the end is this close.
    pub stop_tolerance: f64,
    /// Lateral offset of the mirrored transit pose.
    pub transit_offset: f64,
    /// Drop poses whose footprint collides or leaves the geofence.
    pub delete_colliding: bool,
    pub body: Footprint,
    pub extended: Footprint,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            spacing: 0.5,
            stop_tolerance: 0.51,
            transit_offset: 0.1,
            delete_colliding: true,
            body: Footprint::LOW,
            extended: Footprint::HIGH,
        }
    }
}

impl SamplerCfg {
    fn admissible(&self, pose: &Pose, obstacles: &SiteObstacles<'_>) -> bool {
        if !self.delete_colliding {
            return true;
        }
        let body = self.body.at(pose);
        let extended = self.extended.at(pose);
        !obstacles.low.iter().any(|o| body.intersects(o))
            && !obstacles.high.iter().any(|o| extended.intersects(o))
            && obstacles.geofence.contains_polygon(&extended)
    }
}

/// Poses along every feature, one list per feature (possibly empty).
pub fn sample_features(
    features: &[Polyline],
    kind: FeatureKind,
    obstacles: &SiteObstacles<'_>,
    cfg: &SamplerCfg,
) -> Vec<Vec<Pose>> {
    let out: Vec<Vec<Pose>> = features
        .iter()
        .map(|f| sample_feature(f, kind, obstacles, cfg))
        .collect();
    tracing::debug!(
        features = features.len(),
        poses = out.iter().map(Vec::len).sum::<usize>(),
        ?kind,
        "sampled poses"
    );
    out
}

fn sample_feature(
    feature: &Polyline,
    kind: FeatureKind,
    obstacles: &SiteObstacles<'_>,
    cfg: &SamplerCfg,
) -> Vec<Pose> {
    let mut poses = Vec::new();
    let mut emit = |p: Vec2, heading: f64| {
        let pose = Pose::at(p, heading);
        if !cfg.admissible(&pose, obstacles) {
            return;
        }
        poses.push(pose);
        if kind == FeatureKind::Transit {
            let side = heading + FRAC_PI_2;
            let shifted = p + Vec2::new(side.cos(), side.sin()) * cfg.transit_offset;
            poses.push(Pose::at(shifted, heading + PI));
        }
    };

    let mut heading = None;
    for (a, b) in feature.segments() {
        let dir = b - a;
        let len = dir.norm();
        if len == 0.0 {
            continue;
        }
        let theta = angle_of(dir);
        let room = len - cfg.stop_tolerance;
        let steps = if room <= 0.0 {
            0
        } else if cfg.spacing > 0.0 {
            (room / cfg.spacing).ceil() as usize
        } else {
            1
        };
        for k in 0..steps {
            emit(a + dir * (k as f64 * cfg.spacing / len), theta);
        }
        heading = Some(theta);
    }
    if let (Some(theta), Some(&last)) = (heading, feature.points.last()) {
        emit(last, theta);
    }
    poses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn open_site() -> Polygon {
        Polygon::rect(-20.0, -20.0, 40.0, 40.0)
    }

    #[test]
    fn straight_street_is_sampled_every_half_unit() {
        let fence = open_site();
        let obstacles = SiteObstacles {
            geofence: &fence,
            low: &[],
            high: &[],
        };
        let street = Polyline::new(vec![v(0.0, 0.0), v(10.0, 0.0)]);
        let cfg = SamplerCfg::default();
        let poses = sample_features(&[street], FeatureKind::Street, &obstacles, &cfg);
        assert_eq!(poses.len(), 1);
        let poses = &poses[0];
        // 0.0, 0.5, ..., 9.0 while the end is > 0.51 away, then the end point
        assert_eq!(poses.len(), 19 + 1);
        assert!((poses[18].x - 9.0).abs() < 1e-9);
        assert_eq!(poses[19].position(), v(10.0, 0.0));
        assert!(poses.iter().all(|p| p.theta == 0.0));
    }

    #[test]
    fn last_point_is_kept_for_short_features_and_emitted_once() {
        let fence = open_site();
        let obstacles = SiteObstacles {
            geofence: &fence,
            low: &[],
            high: &[],
        };
        let cfg = SamplerCfg::default();
        let street = Polyline::new(vec![v(0.0, 0.0), v(0.3, 0.0)]);
        let poses = &sample_features(&[street], FeatureKind::Street, &obstacles, &cfg)[0];
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].position(), v(0.3, 0.0));

        let bent = Polyline::new(vec![v(0.0, 0.0), v(2.0, 0.0), v(2.0, 2.0)]);
        let poses = &sample_features(&[bent], FeatureKind::Street, &obstacles, &cfg)[0];
        let at_end = poses.iter().filter(|p| p.position() == v(2.0, 2.0)).count();
        assert_eq!(at_end, 1);
        assert!((poses.last().unwrap().theta - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn transit_poses_are_mirrored() {
        let fence = open_site();
        let obstacles = SiteObstacles {
            geofence: &fence,
            low: &[],
            high: &[],
        };
        let lane = Polyline::new(vec![v(0.0, 0.0), v(0.0, 2.0)]);
        let cfg = SamplerCfg::default();
        let poses = &sample_features(&[lane], FeatureKind::Transit, &obstacles, &cfg)[0];
        assert_eq!(poses.len() % 2, 0);
        for pair in poses.chunks(2) {
            let (fwd, back) = (pair[0], pair[1]);
            assert!((back.x - (fwd.x - 0.1)).abs() < 1e-12);
            assert!((back.y - fwd.y).abs() < 1e-12);
            assert!((back.theta + FRAC_PI_2).abs() < 1e-12);
        }
    }

    #[test]
    fn colliding_poses_are_dropped() {
        let fence = open_site();
        let low = [Polygon::rect(4.0, 1.0, 5.0, 2.0)];
        let high = [Polygon::rect(14.0, -2.0, 15.0, -1.5)];
        let obstacles = SiteObstacles {
            geofence: &fence,
            low: &low,
            high: &high,
        };
        let street = Polyline::new(vec![v(0.0, 0.0), v(20.0, 0.0)]);
        let cfg = SamplerCfg::default();
        let poses = &sample_features(&[street.clone()], FeatureKind::Street, &obstacles, &cfg)[0];
        // body reaches 1.8 sideways: x in [0.5, 8.5] hits the low box
        assert!(poses.iter().all(|p| p.x < 0.5 || p.x > 8.5));
        // extended footprint spans [x - 3.5, x + 6.5]
        assert!(poses.iter().all(|p| p.x < 7.5 || p.x > 18.5));
        assert!(poses.iter().any(|p| p.x > 18.5));

        let keep_all = SamplerCfg {
            delete_colliding: false,
            ..cfg
        };
        let all = &sample_features(&[street], FeatureKind::Street, &obstacles, &keep_all)[0];
        assert_eq!(all.len(), 40);
    }

    #[test]
    fn poses_outside_the_geofence_are_dropped() {
        let fence = Polygon::rect(-5.0, -5.0, 12.0, 5.0);
        let obstacles = SiteObstacles {
            geofence: &fence,
            low: &[],
            high: &[],
        };
        let street = Polyline::new(vec![v(0.0, 0.0), v(10.0, 0.0)]);
        let cfg = SamplerCfg::default();
        let poses = &sample_features(&[street], FeatureKind::Street, &obstacles, &cfg)[0];
        // front overhang of 6.5 must stay inside x < 12
        assert!(!poses.is_empty());
        assert!(poses.iter().all(|p| p.x + 6.5 < 12.0));
    }

    #[test]
    fn spacing_longer_than_the_segment_still_terminates() {
        let fence = open_site();
        let obstacles = SiteObstacles {
            geofence: &fence,
            low: &[],
            high: &[],
        };
        let cfg = SamplerCfg {
            spacing: 5.0,
            ..SamplerCfg::default()
        };
        let street = Polyline::new(vec![v(0.0, 0.0), v(2.0, 0.0), v(14.0, 0.0)]);
        let poses = &sample_features(&[street], FeatureKind::Street, &obstacles, &cfg)[0];
        let xs = [0.0, 2.0, 7.0, 12.0, 14.0];
        assert_eq!(poses.len(), xs.len());
        assert!(poses.iter().zip(xs).all(|(p, x)| (p.x - x).abs() < 1e-9));

        let stalled = SamplerCfg {
            spacing: 0.0,
            ..SamplerCfg::default()
        };
        let short = Polyline::new(vec![v(0.0, 0.0), v(2.0, 0.0)]);
        let poses = &sample_features(&[short], FeatureKind::Street, &obstacles, &stalled)[0];
        assert_eq!(poses.len(), 2);
    }
}
