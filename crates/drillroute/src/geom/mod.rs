//! Planar geometry used by every planning stage.
//!
//! Purpose
//! - Poses with wrapped headings, rigid 2D frames (translate/rotate and the
//!   principal-axis frame of a curve), polygons and polylines with the few
//!   predicates the planner needs, vehicle footprints, and the buffered
//!   "blocked" geometry that edges and manoeuvres must avoid.
//!
//! Why hand-rolled
//! - The planner needs distances and intersection tests between segments,
//!   disks and simple polygons, nothing more. Buffers are represented
//!   implicitly (a shape plus a radius) so "intersects buffer(S, r)" is the
//!   exact test `dist(·, S) <= r` and no polygon union is ever materialised.
//!
//! Code cross-refs: `Pose`, `Frame`, `Polygon`, `Polyline`, `Footprint`,
//! `BlockedGeometry`.

mod blocked;
mod footprint;
mod frame;
mod shapes;
mod types;

pub use blocked::{BlockedGeometry, BlockedPart};
pub use footprint::Footprint;
pub use frame::{rotate, translate, Frame};
pub use shapes::{
    point_segment_distance, segment_distance, segment_intersection, segments_intersect, select_near,
    Polygon, Polyline,
};
pub use types::{angle_of, wrap_angle, Pose};

/// 2D vector alias used across the crate.
pub type Vec2 = nalgebra::Vector2<f64>;
