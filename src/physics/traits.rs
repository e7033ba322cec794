//! Traits for the problem-specific pieces the training loop is assembled from.

use nalgebra::Vector2;

use crate::error::{PinnError, Result};
use crate::network::Jet;

/// Boundary-enforcing trial form `ψ = g(x, y) · N(x, y)`.
pub trait Ansatz {
    /// Jet of the multiplier `g` at `p`.
    fn boundary_factor(&self, p: &Vector2<f64>) -> Result<Jet>;

    /// Jets of `g` at every point.
    fn boundary_factors(&self, points: &[Vector2<f64>]) -> Result<Vec<Jet>> {
        points.iter().map(|p| self.boundary_factor(p)).collect()
    }

    /// Wavefunction jets from raw network output jets.
    fn compose_psi(&self, points: &[Vector2<f64>], raw: &[Jet]) -> Result<Vec<Jet>> {
        if points.len() != raw.len() {
            return Err(PinnError::ShapeMismatch { expected: points.len(), got: raw.len() });
        }
        let factors = self.boundary_factors(points)?;
        Ok(factors.iter().zip(raw).map(|(g, n)| g.mul(n)).collect())
    }
}

/// Pointwise PDE residual that is linear in the wavefunction jet.
pub trait ResidualLoss {
    /// Residual at a single point for trial eigenvalue `energy`.
    fn residual(&self, psi: &Jet, energy: f64) -> f64;

    /// `∂residual / ∂ψ-jet`, independent of `ψ` because the residual is linear.
    fn residual_gradient(&self, energy: f64) -> Jet;

    /// Mean squared residual over the batch.
    fn pde_loss(&self, psi: &[Jet], energy: f64) -> Result<f64> {
        if psi.is_empty() {
            return Err(PinnError::EmptyBatch);
        }
        let sum: f64 = psi.iter().map(|p| self.residual(p, energy).powi(2)).sum();
        Ok(sum / psi.len() as f64)
    }

    /// Mean squared residual together with its adjoint with respect to every ψ jet.
    fn pde_loss_with_grad(&self, psi: &[Jet], energy: f64) -> Result<(f64, Vec<Jet>)> {
        if psi.is_empty() {
            return Err(PinnError::EmptyBatch);
        }
        let n = psi.len() as f64;
        let dr = self.residual_gradient(energy);
        let mut loss = 0.0;
        let adjoints = psi
            .iter()
            .map(|p| {
                let r = self.residual(p, energy);
                loss += r * r;
                let scale = 2.0 * r / n;
                Jet::new(scale * dr.value, scale * dr.dx, scale * dr.dy, scale * dr.dxx, scale * dr.dyy)
            })
            .collect();
        Ok((loss / n, adjoints))
    }
}

/// Maps a training iteration to the trial eigenvalue used in that iteration.
pub trait EigenvalueSchedule {
    fn eigenvalue(&self, iteration: usize) -> f64;
}

impl<F> EigenvalueSchedule for F
where
    F: Fn(usize) -> f64,
{
    fn eigenvalue(&self, iteration: usize) -> f64 {
        self(iteration)
    }
}
