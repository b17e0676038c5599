//! End-to-end planning: request in, pose graph out.
//!
//! Stages, with the progress range each one covers:
//! 1. validate the request;
//! 2. optionally fit the streets (1–10);
//! 3. filter holes to the free part of the site and enforce the hole limit;
//! 4. build the blocked area and assign each hole its closest street;
//! 5. sample street and transit poses;
//! 6. assemble and validate the graph (10–95), then report 100.
//!
//! Obstacle sets that are switched off in [`PlanOptions`] are ignored by
//! every stage.

use serde::{Deserialize, Serialize};

use crate::error::{HoleId, PlanError};
use crate::fit::{fit_all_streets, FitCfg};
use crate::geom::{BlockedGeometry, Polygon, Polyline, Pose, Vec2};
use crate::graph::{assemble, AssemblyCfg, AssemblyInput, HoleTarget, PoseGraph};
use crate::progress::{Progress, ProgressSink};
use crate::sampler::{sample_features, FeatureKind, SamplerCfg, SiteObstacles};

/// Drill hole as supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoleInput {
    pub id: HoleId,
    pub x: f64,
    pub y: f64,
}

impl HoleInput {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Site geometry in one planar metric coordinate system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub geofence: Polygon,
    /// Two-point line: home position, then a point it faces.
    pub home: [Vec2; 2],
    pub streets: Vec<Polyline>,
    #[serde(default)]
    pub transit_streets: Vec<Polyline>,
    pub holes: Vec<HoleInput>,
    #[serde(default)]
    pub low_obstacles: Vec<Polygon>,
    #[serde(default)]
    pub high_obstacles: Vec<Polygon>,
}

impl PlanRequest {
    pub fn home_pose(&self) -> Pose {
        Pose::from_heading_line(self.home[0], self.home[1])
    }

    fn validate(&self) -> Result<(), PlanError> {
        if !self.geofence.is_valid() {
            return Err(PlanError::InvalidInput(
                "geofence needs at least three distinct vertices".into(),
            ));
        }
        if !self.streets.iter().any(|s| s.len() >= 2) {
            return Err(PlanError::InvalidInput(
                "at least one street with two or more points is required".into(),
            ));
        }
        if !self.home_pose().is_finite() || self.home[0] == self.home[1] {
            return Err(PlanError::InvalidInput(
                "home line must be two distinct finite points".into(),
            ));
        }
        if let Some(h) = self.holes.iter().find(|h| !(h.x.is_finite() && h.y.is_finite())) {
            return Err(PlanError::InvalidInput(format!(
                "drill hole {} has non-finite coordinates",
                h.id
            )));
        }
        Ok(())
    }
}

/// Feature switches of one planning run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    pub fit_streets: bool,
    /// Prune and fit a second time (only with `fit_streets`).
    pub fit_twice: bool,
    pub use_obstacles: bool,
    pub use_high_obstacles: bool,
    pub use_transit_streets: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlanCfg {
    pub fit: FitCfg,
    pub sampler: SamplerCfg,
    pub assembly: AssemblyCfg,
    pub max_holes: usize,
}

impl Default for PlanCfg {
    fn default() -> Self {
        Self {
            fit: FitCfg::default(),
            sampler: SamplerCfg::default(),
            assembly: AssemblyCfg::default(),
            max_holes: 500,
        }
    }
}

/// Result of a successful run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    pub graph: PoseGraph,
    /// Streets as used for sampling (fitted when requested).
    pub streets: Vec<Polyline>,
    /// Holes that survived filtering, in request order.
    pub holes: Vec<HoleInput>,
}

/// Index of the street closest to `p`, if any street is non-empty.
fn closest_street(p: Vec2, streets: &[Polyline]) -> Option<usize> {
    streets
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_empty())
        .map(|(i, s)| (i, s.distance_to_point(p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Run the whole pipeline.
pub fn plan(
    request: &PlanRequest,
    options: &PlanOptions,
    cfg: &PlanCfg,
    sink: &dyn ProgressSink,
) -> Result<PlanOutput, PlanError> {
    let progress = Progress::new(sink);
    request.validate()?;

    let low: &[Polygon] = if options.use_obstacles {
        &request.low_obstacles
    } else {
        &[]
    };
    let high: &[Polygon] = if options.use_high_obstacles {
        &request.high_obstacles
    } else {
        &[]
    };

    let streets = if options.fit_streets {
        progress.report(1.0);
        let positions: Vec<Vec2> = request.holes.iter().map(HoleInput::position).collect();
        fit_all_streets(
            &request.streets,
            &positions,
            &request.geofence,
            low,
            high,
            options.fit_twice,
            &cfg.fit,
            &progress,
        )
    } else {
        request.streets.clone()
    };

    let holes: Vec<HoleInput> = request
        .holes
        .iter()
        .filter(|h| {
            let p = h.position();
            request.geofence.contains_point(p)
                && !low.iter().chain(high).any(|o| o.contains_point(p))
        })
        .copied()
        .collect();
    tracing::info!(
        requested = request.holes.len(),
        kept = holes.len(),
        "drill holes filtered"
    );
    if holes.len() > cfg.max_holes {
        return Err(PlanError::TooManyHoles {
            count: holes.len(),
            max: cfg.max_holes,
        });
    }

    let positions: Vec<Vec2> = holes.iter().map(HoleInput::position).collect();
    let obstacles: Vec<Polygon> = low.iter().chain(high).cloned().collect();
    let blocked = BlockedGeometry::build(
        &positions,
        &obstacles,
        &request.geofence,
        cfg.assembly.obstacle_buffer,
    );
    progress.report(10.0);

    let targets: Vec<HoleTarget> = holes
        .iter()
        .map(|h| HoleTarget {
            id: h.id,
            position: h.position(),
            street: closest_street(h.position(), &streets),
        })
        .collect();

    let site = SiteObstacles {
        geofence: &request.geofence,
        low,
        high,
    };
    let street_poses = sample_features(&streets, FeatureKind::Street, &site, &cfg.sampler);
    let transit_poses = if options.use_transit_streets {
        sample_features(&request.transit_streets, FeatureKind::Transit, &site, &cfg.sampler)
    } else {
        Vec::new()
    };

    let input = AssemblyInput {
        home: request.home_pose(),
        street_poses: &street_poses,
        transit_poses: &transit_poses,
        holes: &targets,
        blocked: &blocked,
    };
    let graph = assemble(&input, &cfg.assembly, &progress)?;
    progress.report(100.0);

    Ok(PlanOutput {
        graph,
        streets,
        holes,
    })
}
