//! Polygons, polylines and segment predicates.

use serde::{Deserialize, Serialize};

use super::Vec2;

#[inline]
fn cross2(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Distance from `p` to the closed segment `[a, b]`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Parameters `(t, u)` of the proper crossing `a + t(b-a) = c + u(d-c)`, both in `[0, 1]`.
///
/// Parallel (including collinear) segments return `None`.
pub fn segment_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<(f64, f64)> {
    let r = b - a;
    let s = d - c;
    let den = cross2(r, s);
    if den.abs() <= 1e-15 * r.norm().max(1.0) * s.norm().max(1.0) {
        return None;
    }
    let qp = c - a;
    let t = cross2(qp, s) / den;
    let u = cross2(qp, r) / den;
    const EPS: f64 = 1e-12;
    if (-EPS..=1.0 + EPS).contains(&t) && (-EPS..=1.0 + EPS).contains(&u) {
        Some((t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Closed-segment intersection test (touching and collinear overlap count).
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    if segment_intersection(a, b, c, d).is_some() {
        return true;
    }
    // Parallel or numerically borderline: fall back to endpoint distances.
    const TOUCH: f64 = 1e-12;
    point_segment_distance(a, c, d) <= TOUCH
        || point_segment_distance(b, c, d) <= TOUCH
        || point_segment_distance(c, a, b) <= TOUCH
        || point_segment_distance(d, a, b) <= TOUCH
}

/// Distance between closed segments `[a, b]` and `[c, d]`.
pub fn segment_distance(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> f64 {
    if segments_intersect(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

/// Simple polygon given by its exterior ring (implicitly closed).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct Polygon {
    exterior: Vec<Vec2>,
}

impl From<Vec<Vec2>> for Polygon {
    fn from(v: Vec<Vec2>) -> Self {
        Polygon::new(v)
    }
}

impl From<Polygon> for Vec<Vec2> {
    fn from(p: Polygon) -> Self {
        p.exterior
    }
}

impl Polygon {
    /// Build from an exterior ring; a repeated closing vertex is dropped.
    pub fn new(mut exterior: Vec<Vec2>) -> Self {
        if exterior.len() > 1 && (exterior[0] - exterior[exterior.len() - 1]).norm() < 1e-12 {
            exterior.pop();
        }
        Self { exterior }
    }

    /// Axis-aligned rectangle `[x0, x1] × [y0, y1]`.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(vec![
            Vec2::new(x0, y0),
            Vec2::new(x1, y0),
            Vec2::new(x1, y1),
            Vec2::new(x0, y1),
        ])
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.exterior
    }

    /// A polygon needs at least three vertices to enclose area.
    pub fn is_valid(&self) -> bool {
        self.exterior.len() >= 3 && self.exterior.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Boundary edges including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.exterior.len();
        (0..n).map(move |k| (self.exterior[k], self.exterior[(k + 1) % n]))
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Even-odd ray casting; points on the boundary may land on either side.
    pub fn contains_point(&self, p: Vec2) -> bool {
        if self.exterior.len() < 3 {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// True if any of `points` lies inside or on the boundary.
    pub fn contains_any(&self, points: &[Vec2]) -> bool {
        points
            .iter()
            .any(|&p| self.contains_point(p) || self.boundary_distance(p) <= 1e-12)
    }

    /// Distance from `p` to the boundary ring (ignores the interior).
    pub fn boundary_distance(&self, p: Vec2) -> f64 {
        self.edges()
            .map(|(a, b)| point_segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance from `p` to the filled polygon (zero inside).
    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        if self.contains_point(p) {
            0.0
        } else {
            self.boundary_distance(p)
        }
    }

    /// Distance from segment `[a, b]` to the boundary ring.
    pub fn boundary_segment_distance(&self, a: Vec2, b: Vec2) -> f64 {
        self.edges()
            .map(|(c, d)| segment_distance(a, b, c, d))
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance from segment `[a, b]` to the filled polygon (zero if they meet).
    pub fn segment_distance(&self, a: Vec2, b: Vec2) -> f64 {
        if self.contains_point(a) || self.contains_point(b) {
            return 0.0;
        }
        self.boundary_segment_distance(a, b)
    }

    /// Filled-polygon intersection (touching counts, as does containment either way).
    pub fn intersects(&self, other: &Polygon) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                if segments_intersect(a, b, c, d) {
                    return true;
                }
            }
        }
        self.contains_point(other.exterior[0]) || other.contains_point(self.exterior[0])
    }

    /// True if `other` lies entirely inside this polygon without touching its boundary.
    pub fn contains_polygon(&self, other: &Polygon) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        if !other.exterior.iter().all(|&p| self.contains_point(p)) {
            return false;
        }
        !self
            .edges()
            .any(|(a, b)| other.edges().any(|(c, d)| segments_intersect(a, b, c, d)))
    }

    /// Points along the boundary every `step` units of arc length, starting at vertex 0.
    pub fn sample_boundary(&self, step: f64) -> Vec<Vec2> {
        if self.exterior.is_empty() || step <= 0.0 {
            return Vec::new();
        }
        let mut ring = self.exterior.clone();
        ring.push(self.exterior[0]);
        let ring = Polyline::new(ring);
        let length = ring.length();
        let mut out = Vec::new();
        let mut s = 0.0;
        while s < length {
            out.push(ring.interpolate(s));
            s += step;
        }
        out
    }
}

/// Open polyline (street centrelines, trajectories).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    pub points: Vec<Vec2>,
}

impl Polyline {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Point at arc length `s`, clamped to the ends.
    pub fn interpolate(&self, s: f64) -> Vec2 {
        let Some(&first) = self.points.first() else {
            return Vec2::zeros();
        };
        if s <= 0.0 {
            return first;
        }
        let mut acc = 0.0;
        for (a, b) in self.segments() {
            let l = (b - a).norm();
            if acc + l >= s && l > 0.0 {
                return a + (b - a) * ((s - acc) / l);
            }
            acc += l;
        }
        self.points[self.points.len() - 1]
    }

    /// Sub-polyline between arc lengths `s0 <= s1` (both clamped).
    pub fn substring(&self, s0: f64, s1: f64) -> Polyline {
        let total = self.length();
        let s0 = s0.clamp(0.0, total);
        let s1 = s1.clamp(s0, total);
        let mut out = vec![self.interpolate(s0)];
        // Vertices strictly between s0 and s1.
        let mut acc = 0.0;
        for (a, b) in self.segments() {
            acc += (b - a).norm();
            if acc > s0 && acc < s1 {
                out.push(b);
            }
        }
        out.push(self.interpolate(s1));
        out.dedup_by(|a, b| (*a - *b).norm() < 1e-12);
        Polyline::new(out)
    }

    pub fn reversed(&self) -> Polyline {
        let mut pts = self.points.clone();
        pts.reverse();
        Polyline::new(pts)
    }

    /// Insert vertices so no segment is longer than `max_len`.
    pub fn segmentize(&self, max_len: f64) -> Polyline {
        if self.points.len() < 2 || max_len <= 0.0 {
            return self.clone();
        }
        let mut out = vec![self.points[0]];
        for (a, b) in self.segments() {
            let n = ((b - a).norm() / max_len).ceil().max(1.0) as usize;
            for k in 1..=n {
                out.push(a + (b - a) * (k as f64 / n as f64));
            }
        }
        Polyline::new(out)
    }

    /// Douglas–Peucker simplification keeping both endpoints.
    pub fn simplify(&self, tolerance: f64) -> Polyline {
        if self.points.len() < 3 {
            return self.clone();
        }
        let mut keep = vec![false; self.points.len()];
        keep[0] = true;
        keep[self.points.len() - 1] = true;
        let mut stack = vec![(0usize, self.points.len() - 1)];
        while let Some((i, j)) = stack.pop() {
            let (a, b) = (self.points[i], self.points[j]);
            let mut best = (0.0, i);
            for k in i + 1..j {
                let d = point_segment_distance(self.points[k], a, b);
                if d > best.0 {
                    best = (d, k);
                }
            }
            if best.0 > tolerance {
                keep[best.1] = true;
                stack.push((i, best.1));
                stack.push((best.1, j));
            }
        }
        Polyline::new(
            self.points
                .iter()
                .zip(keep)
                .filter_map(|(p, k)| k.then_some(*p))
                .collect(),
        )
    }

    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        match self.points.len() {
            0 => f64::INFINITY,
            1 => (p - self.points[0]).norm(),
            _ => self
                .segments()
                .map(|(a, b)| point_segment_distance(p, a, b))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// Points of `candidates` within `radius` of the polyline through `curve`.
pub fn select_near(curve: &[Vec2], candidates: &[Vec2], radius: f64) -> Vec<Vec2> {
    let line = Polyline::new(curve.to_vec());
    candidates
        .iter()
        .copied()
        .filter(|&p| line.distance_to_point(p) <= radius)
        .collect()
}
