//! Composite street-shape penalty and its analytic gradient.
//!
//! The curve lives in its principal-axis frame: `x` is fixed, only `y` moves.
//! Terms (n points, m = n - 2 interior points):
//! - fidelity: `w_f · mean_{interior} (y - y0)²`
//! - curvature: `k_i = (y_{i-1} + y_{i+1} - 2 y_i)² / (x_{i+1} - x_{i-1})²`,
//!   penalised as `w_c · mean k` plus `w_o · mean (k - t)·relu(k - t)`
//! - anchors: `w_a (y_j - y0_j)²` for the first two and last two points
//! - repulsion from holes, low and high obstacle samples at every curve point,
//!   and from high samples at the "primer" point ahead of each interior point.

use super::FitCfg;
use crate::geom::Vec2;

/// Smooth, short-range repulsion as a function of squared distance `u`:
/// `weight / (u + offset) · σ(sharpness · (radius_sq - u))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Repulsion {
    pub weight: f64,
    pub offset: f64,
    pub sharpness: f64,
    pub radius_sq: f64,
}

impl Repulsion {
    /// Inverse-square hole term, fading out at radius 3.
    pub const HOLE_FAR: Repulsion = Repulsion {
        weight: 0.5,
        offset: 0.0,
        sharpness: 1.0,
        radius_sq: 9.0,
    };
    /// Body clearance term used for holes and both obstacle classes.
    pub const BODY: Repulsion = Repulsion {
        weight: 20.0,
        offset: 0.5,
        sharpness: 5.0,
        radius_sq: 2.1 * 2.1,
    };
    /// Overhang term between the primer point and high obstacles.
    pub const PRIMER: Repulsion = Repulsion {
        weight: 2.0,
        offset: 0.5,
        sharpness: 5.0,
        radius_sq: 2.1 * 2.1,
    };

    /// Value and derivative with respect to `u`.
    #[inline]
    pub fn eval(&self, u: f64) -> (f64, f64) {
        let s = sigmoid(self.sharpness * (self.radius_sq - u));
        let inv = 1.0 / (u + self.offset);
        let value = self.weight * inv * s;
        let d = -self.weight * inv * inv * s - self.weight * inv * s * (1.0 - s) * self.sharpness;
        (value, d)
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// One street in its local frame plus the repulsors near it.
#[derive(Clone, Debug)]
pub struct CurveProblem<'a> {
    pub x: &'a [f64],
    pub y0: &'a [f64],
    pub holes: &'a [Vec2],
    pub low: &'a [Vec2],
    pub high: &'a [Vec2],
    pub cfg: &'a FitCfg,
}

impl CurveProblem<'_> {
    /// Penalty at `y`; writes the gradient into `grad` (same length as `y`).
    ///
    /// Requires `y.len() >= 3`.
    pub fn loss_grad(&self, y: &[f64], grad: &mut [f64]) -> f64 {
        let n = y.len();
        debug_assert!(n >= 3 && self.x.len() == n && grad.len() == n);
        let cfg = self.cfg;
        let m = (n - 2) as f64;
        grad.iter_mut().for_each(|g| *g = 0.0);
        let mut loss = 0.0;

        for i in 1..n - 1 {
            let r = y[i] - self.y0[i];
            loss += cfg.fidelity_weight * r * r / m;
            grad[i] += cfg.fidelity_weight * 2.0 * r / m;
        }

        for i in 1..n - 1 {
            let e = y[i - 1] + y[i + 1] - 2.0 * y[i];
            let dx = self.x[i + 1] - self.x[i - 1];
            let den = dx * dx;
            let k = e * e / den;
            let over = k - cfg.curvature_threshold;
            loss += cfg.curvature_weight * k / m;
            let mut dk = cfg.curvature_weight / m;
            if over > 0.0 {
                loss += cfg.overshoot_weight * over * over / m;
                dk += cfg.overshoot_weight * 2.0 * over / m;
            }
            let de = dk * 2.0 * e / den;
            grad[i - 1] += de;
            grad[i] -= 2.0 * de;
            grad[i + 1] += de;
        }

        for j in [0, 1, n - 2, n - 1] {
            let r = y[j] - self.y0[j];
            loss += cfg.anchor_weight * r * r;
            grad[j] += cfg.anchor_weight * 2.0 * r;
        }

        for i in 0..n {
            let p = Vec2::new(self.x[i], y[i]);
            for q in self.holes {
                loss += repel(&[Repulsion::HOLE_FAR, Repulsion::BODY], p, *q, &mut grad[i]);
            }
            for q in self.low.iter().chain(self.high) {
                loss += repel(&[Repulsion::BODY], p, *q, &mut grad[i]);
            }
        }

        if !self.high.is_empty() {
            for i in 1..n - 1 {
                loss += self.primer_term(y, i, grad);
            }
        }
        loss
    }

    /// Repulsion between the primer ahead of point `i` and every high sample.
    fn primer_term(&self, y: &[f64], i: usize, grad: &mut [f64]) -> f64 {
        let cx = self.x[i + 1] - self.x[i - 1];
        let cy = y[i + 1] - y[i - 1];
        let l = (cx * cx + cy * cy).sqrt();
        let a = self.cfg.primer_offset;
        let p = Vec2::new(self.x[i] + a * cx / l, y[i] + a * cy / l);
        let mut loss = 0.0;
        let mut g = Vec2::zeros();
        for q in self.high {
            let d = p - q;
            let (v, dv) = Repulsion::PRIMER.eval(d.norm_squared());
            loss += v;
            g += d * (2.0 * dv);
        }
        // dp/dcy = a·(-cx·cy, cx²)/l³; cy = y[i+1] - y[i-1]
        let l3 = l * l * l;
        let dcy = a * (-cx * cy * g.x + cx * cx * g.y) / l3;
        grad[i] += g.y;
        grad[i + 1] += dcy;
        grad[i - 1] -= dcy;
        loss
    }

    /// Penalty only (used by tests and diagnostics).
    pub fn loss(&self, y: &[f64]) -> f64 {
        let mut scratch = vec![0.0; y.len()];
        self.loss_grad(y, &mut scratch)
    }
}

#[inline]
fn repel(terms: &[Repulsion], p: Vec2, q: Vec2, grad_y: &mut f64) -> f64 {
    let d = p - q;
    let u = d.norm_squared();
    let mut loss = 0.0;
    for t in terms {
        let (v, dv) = t.eval(u);
        loss += v;
        *grad_y += dv * 2.0 * d.y;
    }
    loss
}
