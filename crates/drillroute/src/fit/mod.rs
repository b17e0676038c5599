//! Street smoothing: curve fitter, collision pruner and the all-streets driver.
//!
//! Purpose
//! - Reshape raw street centrelines into smooth curves that keep clear of
//!   drill holes and obstacles while staying close to the surveyed line and
//!   keeping their end junctions in place.
//!
//! Why this design
//! - The curve is expressed in its principal-axis frame so `y` is a function
//!   of a fixed, roughly monotone `x`; only the `y` values are optimised.
//! - The penalty is a closed-form sum (see `loss`), so its gradient is
//!   written out by hand and driven by a small Adam loop with a fixed
//!   step-size schedule and iteration budget.
//! - Non-finite results are not an error: the original curve is returned and
//!   the event is logged.
//!
//! Code cross-refs: `geom::{Frame, Footprint, Polyline, select_near}`.

mod adam;
mod loss;
mod prune;

pub use adam::Adam;
pub use loss::{CurveProblem, Repulsion};
pub use prune::prune_colliding;

use crate::geom::{select_near, Frame, Polygon, Polyline, Vec2};
use crate::progress::Progress;

/// Weights, schedule and neighbourhood radii of the street fitter.
#[derive(Clone, Debug, PartialEq)]
pub struct FitCfg {
    pub fidelity_weight: f64,
    pub curvature_weight: f64,
    pub overshoot_weight: f64,
    /// Squared-curvature level above which the overshoot term applies.
    pub curvature_threshold: f64,
    pub anchor_weight: f64,
    /// Distance of the primer point ahead of the curve point.
    pub primer_offset: f64,
    pub iterations: usize,
    /// `(first_step, learning_rate)` pairs, ascending by step.
    pub lr_schedule: Vec<(usize, f64)>,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    /// Streets are densified to at most this segment length before fitting.
    pub max_segment_length: f64,
    /// Holes within this distance of a street repel it.
    pub hole_radius: f64,
    /// High samples (geofence + high obstacles) within this distance repel it.
    pub high_radius: f64,
    /// Obstacle boundaries are sampled at this spacing.
    pub boundary_step: f64,
    /// Douglas–Peucker tolerance applied to the fitted street.
    pub simplify_tolerance: f64,
}

impl Default for FitCfg {
    fn default() -> Self {
        Self {
            fidelity_weight: 0.05,
            curvature_weight: 60.0,
            overshoot_weight: 200.0,
            curvature_threshold: 0.003,
            anchor_weight: 10.0,
            primer_offset: 3.0,
            iterations: 300,
            lr_schedule: vec![(0, 0.001), (100, 0.01), (200, 0.03)],
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            max_segment_length: 1.0,
            hole_radius: 7.0,
            high_radius: 11.0,
            boundary_step: 1.0,
            simplify_tolerance: 0.1,
        }
    }
}

impl FitCfg {
    fn learning_rate(&self, step: usize) -> f64 {
        self.lr_schedule
            .iter()
            .take_while(|(from, _)| *from <= step)
            .last()
            .map(|&(_, lr)| lr)
            .unwrap_or(0.0)
    }
}

/// Smooth one curve against the given repulsor samples (world coordinates).
///
/// Curves with fewer than three points have no interior and are returned as
/// is. If the optimiser produces a non-finite value the input is returned
/// unchanged.
pub fn fit_curve(
    curve: &[Vec2],
    holes: &[Vec2],
    low: &[Vec2],
    high: &[Vec2],
    cfg: &FitCfg,
) -> Vec<Vec2> {
    if curve.len() < 3 {
        return curve.to_vec();
    }
    let Some(frame) = Frame::principal(curve) else {
        return curve.to_vec();
    };
    let local = frame.to_local(curve);
    let (holes, low, high) = (frame.to_local(holes), frame.to_local(low), frame.to_local(high));
    let x: Vec<f64> = local.iter().map(|p| p.x).collect();
    let y0: Vec<f64> = local.iter().map(|p| p.y).collect();
    let problem = CurveProblem {
        x: &x,
        y0: &y0,
        holes: &holes,
        low: &low,
        high: &high,
        cfg,
    };

    let mut y = y0.clone();
    let mut grad = vec![0.0; y.len()];
    let mut adam = Adam::new(y.len(), cfg.beta1, cfg.beta2, cfg.eps);
    let mut loss = 0.0;
    for step in 0..cfg.iterations {
        loss = problem.loss_grad(&y, &mut grad);
        adam.step(&mut y, &grad, cfg.learning_rate(step));
    }

    if y.iter().any(|v| !v.is_finite()) {
        tracing::warn!(
            points = curve.len(),
            loss,
            "non-finite street fit, keeping the original curve"
        );
        return curve.to_vec();
    }
    tracing::trace!(points = curve.len(), loss, "street fitted");
    let fitted: Vec<Vec2> = x.iter().zip(&y).map(|(&x, &y)| Vec2::new(x, y)).collect();
    frame.to_world(&fitted)
}

/// Fit every street of a site.
///
/// Builds the repulsor pools once (geofence boundary and high obstacle
/// boundaries as "high", low obstacle boundaries as "low"), then for each
/// street: densify, select nearby holes and high samples, fit, optionally
/// prune colliding points and fit again, and simplify. Reports progress from
/// 1 to 10 percent.
#[allow(clippy::too_many_arguments)]
pub fn fit_all_streets(
    streets: &[Polyline],
    holes: &[Vec2],
    geofence: &Polygon,
    low_obstacles: &[Polygon],
    high_obstacles: &[Polygon],
    fit_twice: bool,
    cfg: &FitCfg,
    progress: &Progress<'_>,
) -> Vec<Polyline> {
    let mut high_pool = geofence.sample_boundary(cfg.boundary_step);
    for poly in high_obstacles {
        high_pool.extend(poly.sample_boundary(cfg.boundary_step));
    }
    let low: Vec<Vec2> = low_obstacles
        .iter()
        .flat_map(|poly| poly.sample_boundary(cfg.boundary_step))
        .collect();

    let total = streets.len();
    let out = streets
        .iter()
        .enumerate()
        .map(|(index, street)| {
            progress.report(1.0 + 9.0 * index as f64 / total as f64);
            let dense = street.segmentize(cfg.max_segment_length).points;
            let near_holes = select_near(&dense, holes, cfg.hole_radius);
            let near_high = select_near(&dense, &high_pool, cfg.high_radius);
            let mut curve = fit_curve(&dense, &near_holes, &low, &near_high, cfg);
            if fit_twice {
                curve = prune_colliding(&curve, &near_holes, &low, &near_high);
                curve = fit_curve(&curve, &near_holes, &low, &near_high, cfg);
            }
            tracing::debug!(
                street = index,
                points = dense.len(),
                holes = near_holes.len(),
                high = near_high.len(),
                "street fitted"
            );
            Polyline::new(curve).simplify(cfg.simplify_tolerance)
        })
        .collect();
    progress.report(10.0);
    tracing::info!(streets = total, fit_twice, "street fitting done");
    out
}
