/// Adam first-order optimiser state over a flat parameter vector.
#[derive(Clone, Debug)]
pub struct Adam {
    beta1: f64,
    beta2: f64,
    eps: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    pub fn new(n: usize, beta1: f64, beta2: f64, eps: f64) -> Self {
        Self {
            beta1,
            beta2,
            eps,
            m: vec![0.0; n],
            v: vec![0.0; n],
            t: 0,
        }
    }

    /// One bias-corrected update of `params` against `grad` with step size `lr`.
    pub fn step(&mut self, params: &mut [f64], grad: &[f64], lr: f64) {
        self.t += 1;
        let c1 = 1.0 - self.beta1.powi(self.t);
        let c2 = 1.0 - self.beta2.powi(self.t);
        for (k, (p, g)) in params.iter_mut().zip(grad).enumerate() {
            self.m[k] = self.beta1 * self.m[k] + (1.0 - self.beta1) * g;
            self.v[k] = self.beta2 * self.v[k] + (1.0 - self.beta2) * g * g;
            let m_hat = self.m[k] / c1;
            let v_hat = self.v[k] / c2;
            *p -= lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut adam = Adam::new(2, 0.9, 0.999, 1e-8);
        let mut p = [1.0, -1.0];
        adam.step(&mut p, &[4.0, -0.5], 0.01);
        assert!((p[0] - 0.99).abs() < 1e-6);
        assert!((p[1] + 0.99).abs() < 1e-6);
    }

    #[test]
    fn minimises_a_quadratic() {
        let mut adam = Adam::new(1, 0.9, 0.999, 1e-8);
        let mut p = [3.0];
        for _ in 0..2000 {
            let g = [2.0 * (p[0] - 1.0)];
            adam.step(&mut p, &g, 0.01);
        }
        assert!((p[0] - 1.0).abs() < 1e-2);
    }
}
