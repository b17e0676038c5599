//! Cutting a closed ring into pieces.
//!
//! The ring is a closed polyline whose first and last vertex coincide (the
//! seam). Cuts are arc-length positions; a cut within `tol` of the seam is the
//! seam itself, so a splitter touching the ring exactly at its start point
//! never produces a zero-length piece or an extra split there.

use crate::geom::{segment_intersection, Polyline, Vec2};

/// Arc-length ranges `(s0, s1)` covering the ring between consecutive cuts.
///
/// The first range starts at the seam, the last one ends there. Cuts closer
/// than `tol` to each other are merged.
pub fn split_ring(length: f64, cuts: &[f64], tol: f64) -> Vec<(f64, f64)> {
    let mut inner: Vec<f64> = cuts
        .iter()
        .copied()
        .filter(|&s| s.is_finite() && s > tol && s < length - tol)
        .collect();
    inner.sort_by(f64::total_cmp);
    inner.dedup_by(|a, b| (*a - *b).abs() <= tol);
    let mut bounds = Vec::with_capacity(inner.len() + 2);
    bounds.push(0.0);
    bounds.extend(inner);
    bounds.push(length);
    bounds.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Arc-length positions where `ring` crosses the circle `|p - center| = radius`.
pub fn circle_crossings(ring: &Polyline, center: Vec2, radius: f64) -> Vec<f64> {
    let mut out = Vec::new();
    let mut acc = 0.0;
    for (a, b) in ring.segments() {
        let d = b - a;
        let len = d.norm();
        let f = a - center;
        let qa = d.norm_squared();
        let qb = 2.0 * f.dot(&d);
        let qc = f.norm_squared() - radius * radius;
        let disc = qb * qb - 4.0 * qa * qc;
        if qa > 0.0 && disc >= 0.0 {
            let sq = disc.sqrt();
            for t in [(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)] {
                if (0.0..=1.0).contains(&t) {
                    out.push(acc + t * len);
                }
            }
        }
        acc += len;
    }
    out
}

/// Arc-length positions where `ring` crosses the segment `[a, b]`.
pub fn segment_crossings(ring: &Polyline, a: Vec2, b: Vec2) -> Vec<f64> {
    let mut out = Vec::new();
    let mut acc = 0.0;
    for (p, q) in ring.segments() {
        let len = (q - p).norm();
        if let Some((t, _)) = segment_intersection(p, q, a, b) {
            out.push(acc + t * len);
        }
        acc += len;
    }
    out
}
