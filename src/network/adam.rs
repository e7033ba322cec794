//! Adam optimiser over a flat parameter vector.

use nalgebra::DVector;

use crate::error::{PinnError, Result};

/// Adam with bias-corrected first and second moment estimates.
#[derive(Clone, Debug)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    m: DVector<f64>,
    v: DVector<f64>,
    t: i32,
}

impl Adam {
    pub fn new(n_params: usize, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            m: DVector::zeros(n_params),
            v: DVector::zeros(n_params),
            t: 0,
        }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Update `params` in place against `grad`.
    pub fn step(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>) -> Result<()> {
        if params.len() != self.m.len() {
            return Err(PinnError::ShapeMismatch { expected: self.m.len(), got: params.len() });
        }
        if grad.len() != self.m.len() {
            return Err(PinnError::ShapeMismatch { expected: self.m.len(), got: grad.len() });
        }

        self.t = self.t.saturating_add(1);
        let bc1 = 1.0 - self.beta1.powi(self.t);
        let bc2 = 1.0 - self.beta2.powi(self.t);

        for i in 0..params.len() {
            let g = grad[i];
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = self.m[i] / bc1;
            let v_hat = self.v[i] / bc2;
            params[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
        Ok(())
    }
}
