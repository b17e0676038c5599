//! Buffered obstacle geometry ("blocked" area).
//!
//! Each part is a base shape plus a buffer radius; a query shape meets the
//! buffered part iff its distance to the base shape is at most the radius.
//! The union is never built explicitly.

use super::shapes::point_segment_distance;
use super::{Polygon, Polyline, Vec2};

/// One buffered component of the blocked area.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockedPart {
    /// Disk around a point target.
    Disk { center: Vec2, radius: f64 },
    /// Filled polygon grown by `buffer`.
    Area { polygon: Polygon, buffer: f64 },
    /// Polygon boundary (e.g. geofence) grown by `buffer` on both sides.
    Ring { polygon: Polygon, buffer: f64 },
}

impl BlockedPart {
    fn buffer(&self) -> f64 {
        match self {
            BlockedPart::Disk { radius, .. } => *radius,
            BlockedPart::Area { buffer, .. } | BlockedPart::Ring { buffer, .. } => *buffer,
        }
    }

    /// Distance from segment `[a, b]` to the unbuffered base shape.
    fn base_segment_distance(&self, a: Vec2, b: Vec2) -> f64 {
        match self {
            BlockedPart::Disk { center, .. } => point_segment_distance(*center, a, b),
            BlockedPart::Area { polygon, .. } => polygon.segment_distance(a, b),
            BlockedPart::Ring { polygon, .. } => polygon.boundary_segment_distance(a, b),
        }
    }

    fn envelope(&self) -> (Vec2, Vec2) {
        let (lo, hi) = match self {
            BlockedPart::Disk { center, .. } => (*center, *center),
            BlockedPart::Area { polygon, .. } | BlockedPart::Ring { polygon, .. } => {
                polygon.vertices().iter().fold(
                    (
                        Vec2::new(f64::INFINITY, f64::INFINITY),
                        Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
                    ),
                    |(lo, hi), p| (lo.inf(p), hi.sup(p)),
                )
            }
        };
        let r = Vec2::new(self.buffer(), self.buffer());
        (lo - r, hi + r)
    }
}

#[derive(Clone, Debug)]
struct Entry {
    part: BlockedPart,
    lo: Vec2,
    hi: Vec2,
}

/// Union of buffered obstacle parts.
#[derive(Clone, Debug, Default)]
pub struct BlockedGeometry {
    entries: Vec<Entry>,
}

impl BlockedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disks at `holes`, buffered `obstacles`, and the buffered `geofence` boundary.
    pub fn build(holes: &[Vec2], obstacles: &[Polygon], geofence: &Polygon, buffer: f64) -> Self {
        let mut g = Self::new();
        for &center in holes {
            g.push(BlockedPart::Disk {
                center,
                radius: buffer,
            });
        }
        for polygon in obstacles {
            g.push(BlockedPart::Area {
                polygon: polygon.clone(),
                buffer,
            });
        }
        g.push(BlockedPart::Ring {
            polygon: geofence.clone(),
            buffer,
        });
        g
    }

    pub fn push(&mut self, part: BlockedPart) {
        let (lo, hi) = part.envelope();
        self.entries.push(Entry { part, lo, hi });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parts(&self) -> impl Iterator<Item = &BlockedPart> {
        self.entries.iter().map(|e| &e.part)
    }

    /// Copy without the disks lying inside `disk(center, radius)`.
    ///
    /// Used to let a manoeuvre approach its own target, whose disk is part of
    /// the blocked area for every other pose.
    pub fn without_disks_within(&self, center: Vec2, radius: f64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|e| match &e.part {
                    BlockedPart::Disk { center: c, radius: r } => (c - center).norm() + r > radius,
                    _ => true,
                })
                .cloned()
                .collect(),
        }
    }

    /// Does the closed segment `[a, b]` meet the blocked area?
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        let (lo, hi) = (a.inf(&b), a.sup(&b));
        self.entries.iter().any(|e| {
            overlaps(lo, hi, e.lo, e.hi) && e.part.base_segment_distance(a, b) <= e.part.buffer()
        })
    }

    pub fn intersects_polyline(&self, line: &Polyline) -> bool {
        match line.len() {
            0 => false,
            1 => self.intersects_segment(line.points[0], line.points[0]),
            _ => line.segments().any(|(a, b)| self.intersects_segment(a, b)),
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.intersects_segment(p, p)
    }

    /// Distance from the polyline to the blocked area (zero when they meet).
    ///
    /// Returns `f64::INFINITY` when nothing is blocked.
    pub fn distance_to_polyline(&self, line: &Polyline) -> f64 {
        let segs: Vec<(Vec2, Vec2)> = match line.len() {
            0 => return f64::INFINITY,
            1 => vec![(line.points[0], line.points[0])],
            _ => line.segments().collect(),
        };
        let mut best = f64::INFINITY;
        for e in &self.entries {
            for &(a, b) in &segs {
                let d = (e.part.base_segment_distance(a, b) - e.part.buffer()).max(0.0);
                if d < best {
                    best = d;
                    if best == 0.0 {
                        return 0.0;
                    }
                }
            }
        }
        best
    }
}

#[inline]
fn overlaps(alo: Vec2, ahi: Vec2, blo: Vec2, bhi: Vec2) -> bool {
    alo.x <= bhi.x && blo.x <= ahi.x && alo.y <= bhi.y && blo.y <= ahi.y
}
