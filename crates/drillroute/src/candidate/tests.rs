use super::*;
use crate::geom::BlockedPart;

fn v(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

fn far_disk() -> BlockedGeometry {
    let mut g = BlockedGeometry::new();
    g.push(BlockedPart::Disk {
        center: v(50.0, 50.0),
        radius: 0.75,
    });
    g
}

#[test]
fn split_ring_merges_cuts_at_the_seam() {
    let pieces = split_ring(10.0, &[0.0, 0.005, 4.0, 4.000001, 10.0, 9.995, 7.0], 0.01);
    assert_eq!(pieces, vec![(0.0, 4.0), (4.0, 7.0), (7.0, 10.0)]);
    assert_eq!(split_ring(10.0, &[], 0.01), vec![(0.0, 10.0)]);
}

#[test]
fn splitter_through_the_start_point_does_not_split_there() {
    let ring = Polyline::new(vec![
        v(0.0, 0.0),
        v(4.0, 0.0),
        v(4.0, 4.0),
        v(0.0, 4.0),
        v(0.0, 0.0),
    ]);
    // Diagonal through the seam vertex and the opposite corner.
    let cuts = segment_crossings(&ring, v(-1.0, -1.0), v(2.0, 2.0));
    assert!(!cuts.is_empty());
    assert_eq!(split_ring(ring.length(), &cuts, 0.01), vec![(0.0, 16.0)]);

    let mut with_circle = cuts.clone();
    with_circle.extend(circle_crossings(&ring, v(0.0, 0.0), 2.0));
    assert_eq!(
        split_ring(ring.length(), &with_circle, 0.01),
        vec![(0.0, 2.0), (2.0, 14.0), (14.0, 16.0)]
    );
}

#[test]
fn circle_crossings_on_square() {
    let ring = Polyline::new(vec![
        v(0.0, 0.0),
        v(4.0, 0.0),
        v(4.0, 4.0),
        v(0.0, 4.0),
        v(0.0, 0.0),
    ]);
    let s = circle_crossings(&ring, v(0.0, 0.0), 2.0);
    assert_eq!(s.len(), 2);
    assert!((s[0] - 2.0).abs() < 1e-12);
    assert!((s[1] - 14.0).abs() < 1e-12);
}

#[test]
fn envelope_ring_runs_along_both_tangents() {
    let (start, center, target) = (v(0.0, 0.0), v(0.0, 3.0), v(4.0, 10.0));
    let ring = envelope_ring(start, center, 3.0, target, 64).unwrap();
    assert_eq!(ring.points.first(), Some(&start));
    assert_eq!(ring.points.last(), Some(&start));
    let at = ring.points.iter().position(|p| *p == target).unwrap();
    let tangent = (65.0f64 - 9.0).sqrt();
    for side in [ring.points[at - 1], ring.points[at + 1]] {
        assert!(((side - center).norm() - 3.0).abs() < 1e-9);
        assert!(((side - target).norm() - tangent).abs() < 1e-9);
        assert!((side - center).dot(&(target - side)).abs() < 1e-9);
    }
    let alpha = (3.0 / 65.0f64.sqrt()).acos();
    let exact = 3.0 * (TAU - 2.0 * alpha) + 2.0 * tangent;
    assert!((ring.length() - exact).abs() < 0.05, "ring {}", ring.length());
}

#[test]
fn degenerate_envelopes_have_no_ring() {
    // Start on the arc facing the target.
    assert!(envelope_ring(v(0.0, 6.0), v(0.0, 3.0), 3.0, v(0.0, 12.0), 64).is_none());
    // Target inside the circle.
    assert!(envelope_ring(v(0.0, 0.0), v(0.0, 3.0), 3.0, v(0.0, 5.0), 64).is_none());
}

#[test]
fn left_turn_toward_hole() {
    let approach = Pose::new(0.0, 0.0, 0.0);
    let hole = v(4.0, 10.0);
    let c = generate(&approach, hole, &far_disk(), 3.0, 3.8, &CandidateCfg::default()).unwrap();
    // arc of ~82.1° on radius 3 plus ~3.68 straight
    assert!((c.length - 7.983).abs() < 0.05, "length {}", c.length);
    assert_eq!(c.poses.len(), 3);
    let last = c.poses.last().unwrap();
    assert!(((last.position() - hole).norm() - 3.8).abs() < 1e-6);
    assert!(wrap_angle(last.theta - angle_of(hole - last.position())).abs() < 1e-9);
    assert!(last.theta > 1.3 && last.theta < 1.5);
    // intermediate poses turn left progressively
    assert!(c.poses[0].theta > 0.0 && c.poses[0].theta < c.poses[1].theta + 1e-9);
    assert!(c.clearance.is_finite() && c.clearance > 40.0);
}

#[test]
fn right_turn_uses_the_reversed_piece() {
    let approach = Pose::new(0.0, 0.0, 0.0);
    let hole = v(4.0, -10.0);
    let c = generate(&approach, hole, &far_disk(), 3.0, 3.8, &CandidateCfg::default()).unwrap();
    assert!((c.length - 7.983).abs() < 0.05);
    let last = c.poses.last().unwrap();
    assert!(last.theta < -1.3 && last.theta > -1.5);
    assert!(c.poses[0].theta < 0.0);
}

#[test]
fn hole_inside_turning_circle_is_rejected() {
    let approach = Pose::new(0.0, 0.0, 0.0);
    let cfg = CandidateCfg::default();
    assert!(generate(&approach, v(0.0, 4.0), &far_disk(), 3.0, 3.8, &cfg).is_none());
}

#[test]
fn blocked_manoeuvre_is_rejected() {
    let approach = Pose::new(0.0, 0.0, 0.0);
    let mut blocked = far_disk();
    blocked.push(BlockedPart::Disk {
        center: v(3.2, 4.5),
        radius: 0.5,
    });
    let cfg = CandidateCfg::default();
    assert!(generate(&approach, v(4.0, 10.0), &blocked, 3.0, 3.8, &cfg).is_none());
}

#[test]
fn reversing_end_heading_is_optional() {
    let approach = Pose::new(0.0, 0.0, 0.0);
    let hole = v(-4.0, 8.0);
    let cfg = CandidateCfg::default();
    assert!(generate(&approach, hole, &far_disk(), 3.0, 3.8, &cfg).is_none());
    let relaxed = CandidateCfg {
        end_heading_tolerance: None,
        ..cfg
    };
    let c = generate(&approach, hole, &far_disk(), 3.0, 3.8, &relaxed).unwrap();
    let last = c.poses.last().unwrap();
    assert!(((last.position() - hole).norm() - 3.8).abs() < 1e-6);
}

#[test]
fn end_still_on_the_turning_circle_is_rejected() {
    // The clearance circle around a hole just outside the turning circle cuts
    // the ring on the arc, before the straight part starts.
    let approach = Pose::new(0.0, 0.0, 0.0);
    let hole = v(0.0, 6.5);
    let cfg = CandidateCfg {
        end_heading_tolerance: None,
        ..CandidateCfg::default()
    };
    assert!(generate(&approach, hole, &far_disk(), 3.0, 3.8, &cfg).is_none());

    let inside_margin = CandidateCfg {
        turning_margin: -0.5,
        ..cfg
    };
    let c = generate(&approach, hole, &far_disk(), 3.0, 3.8, &inside_margin).unwrap();
    let end = c.poses.last().unwrap().position();
    assert!(((end - v(0.0, 3.0)).norm() - 3.0).abs() < 0.01);
    assert!(((end - hole).norm() - 3.8).abs() < 1e-6);
}

#[test]
fn end_within_the_turning_margin_is_rejected() {
    // Left turn toward (4, 10) ends about 4.74 from the turning centre.
    let approach = Pose::new(0.0, 0.0, 0.0);
    let hole = v(4.0, 10.0);
    let wide = CandidateCfg {
        turning_margin: 2.0,
        ..CandidateCfg::default()
    };
    assert!(generate(&approach, hole, &far_disk(), 3.0, 3.8, &wide).is_none());
    let narrow = CandidateCfg {
        turning_margin: 1.5,
        ..CandidateCfg::default()
    };
    assert!(generate(&approach, hole, &far_disk(), 3.0, 3.8, &narrow).is_some());
}
