//! Pose-graph route planning for drill rigs on an open-pit bench.
//!
//! A site (geofence, streets, drill holes, obstacles) becomes a graph of
//! vehicle poses joined by kinematically feasible straight moves; routes
//! between home and any hole are then A* queries over that graph.
//!
//! Module map
//! - `geom`: poses, polygons, polylines, footprints, blocked area.
//! - `fit`: street smoothing away from holes and obstacles.
//! - `candidate`: turn-then-straight approach to one hole.
//! - `sampler`: poses along streets and transit lanes.
//! - `graph`: edge test, assembly, connectivity, persisted records.
//! - `path`: A* queries and the caller-owned graph handle.
//! - `plan`: the end-to-end pipeline.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; `api`
//!   collects the names callers are expected to use.

pub mod api;
pub mod candidate;
pub mod error;
pub mod fit;
pub mod geom;
pub mod graph;
pub mod path;
pub mod plan;
pub mod progress;
pub mod sampler;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom::Vec2;

/// Common geometry exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom::{BlockedGeometry, Footprint, Polygon, Polyline, Pose, Vec2};
    pub use crate::graph::{PoseGraph, PoseType};
    pub use crate::plan::{plan, PlanCfg, PlanOptions, PlanRequest};
}
