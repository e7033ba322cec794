//! Schrödinger residual for a particle in an infinite square well.
//!
//! Inside the well the potential vanishes and, in units where the
//! characteristic energy is one, the equation reads `½ Δψ + E ψ = 0`.

use serde::{Deserialize, Serialize};

use super::traits::ResidualLoss;
use crate::error::Result;
use crate::network::Jet;

/// `r = c Δψ + E ψ` with kinetic prefactor `c` (½ by default).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchrodingerResidual {
    pub kinetic_prefactor: f64,
}

impl Default for SchrodingerResidual {
    fn default() -> Self {
        Self { kinetic_prefactor: 0.5 }
    }
}

impl ResidualLoss for SchrodingerResidual {
    fn residual(&self, psi: &Jet, energy: f64) -> f64 {
        self.kinetic_prefactor * psi.laplacian() + energy * psi.value
    }

    fn residual_gradient(&self, energy: f64) -> Jet {
        Jet::new(energy, 0.0, 0.0, self.kinetic_prefactor, self.kinetic_prefactor)
    }
}

/// Mean squared residual `mean((½ Δψ + E ψ)²)` of the square-well equation.
pub fn pde_loss(psi: &[Jet], energy: f64) -> Result<f64> {
    SchrodingerResidual::default().pde_loss(psi, energy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PinnError;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// Jet of `sin(nπx) sin(mπy)` at `(x, y)`.
    fn eigenfunction(n: f64, m: f64, x: f64, y: f64) -> Jet {
        let (kx, ky) = (n * PI, m * PI);
        let (sx, cx) = (kx * x).sin_cos();
        let (sy, cy) = (ky * y).sin_cos();
        Jet::new(sx * sy, kx * cx * sy, ky * sx * cy, -kx * kx * sx * sy, -ky * ky * sx * sy)
    }

    fn field(n: f64, m: f64) -> Vec<Jet> {
        (1..10)
            .flat_map(|i| (1..10).map(move |j| (i as f64 / 10.0, j as f64 / 10.0)))
            .map(|(x, y)| eigenfunction(n, m, x, y))
            .collect()
    }

    #[test]
    fn test_zero_field_has_zero_loss() {
        let psi = vec![Jet::default(); 100];
        assert_eq!(pde_loss(&psi, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_exact_eigenfunctions_have_zero_residual() {
        for (n, m) in [(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (3.0, 1.0)] {
            let energy = PI * PI * (n * n + m * m) / 2.0;
            let loss = pde_loss(&field(n, m), energy).unwrap();
            assert_relative_eq!(loss, 0.0, epsilon = 1e-20);
        }
    }

    #[test]
    fn test_wrong_eigenvalue_is_penalised() {
        let ground = pde_loss(&field(1.0, 1.0), PI * PI).unwrap();
        let off = pde_loss(&field(1.0, 1.0), 9.0).unwrap();
        assert!(off > ground);
        assert!(off > 1e-3);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let residual = SchrodingerResidual::default();
        let psi = vec![Jet::new(0.3, 0.1, -0.2, -1.5, 0.7), Jet::new(-0.4, 0.0, 0.5, 2.0, -3.0)];
        let energy = 9.25;
        let (loss, grad) = residual.pde_loss_with_grad(&psi, energy).unwrap();
        assert_relative_eq!(loss, residual.pde_loss(&psi, energy).unwrap(), epsilon = 1e-14);

        let h = 1e-6;
        let mut bumped = psi.clone();
        bumped[1].dxx += h;
        let numeric = (residual.pde_loss(&bumped, energy).unwrap() - loss) / h;
        assert_relative_eq!(grad[1].dxx, numeric, epsilon = 1e-4);

        let mut bumped = psi.clone();
        bumped[0].value += h;
        let numeric = (residual.pde_loss(&bumped, energy).unwrap() - loss) / h;
        assert_relative_eq!(grad[0].value, numeric, epsilon = 1e-3);
        assert_eq!(grad[0].dx, 0.0);
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        assert!(matches!(pde_loss(&[], 1.0), Err(PinnError::EmptyBatch)));
    }
}
