//! Exponential boundary ansatz for the square well.
//!
//! With `d = x - x_min` and `L = x_max - x_min`, the multiplier is
//!
//!   g = (1 - e^{-d_x})(1 - e^{-d_y})(1 - e^{d_x - L})(1 - e^{d_y - L})
//!
//! Each factor vanishes on one wall and tends to 1 away from it, so
//! `ψ = g · N` satisfies the Dirichlet condition whatever the network outputs.

use nalgebra::Vector2;

use super::traits::Ansatz;
use crate::domain::Domain;
use crate::error::{PinnError, Result};
use crate::network::Jet;

/// Slack allowed when checking that a point lies in the box.
const DOMAIN_TOLERANCE: f64 = 1e-12;

/// `ψ = g · N` with `g` built from four exponential wall factors.
#[derive(Copy, Clone, Debug)]
pub struct ExpBoundaryAnsatz {
    domain: Domain,
}

impl ExpBoundaryAnsatz {
    pub fn new(domain: Domain) -> Result<Self> {
        domain.validate()?;
        Ok(Self { domain })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// One-dimensional factor `h(d) = (1 - e^{-d})(1 - e^{d - L})` and its
    /// first two derivatives. `exp_m1` keeps both factors exact near the walls.
    fn axis_factor(&self, d: f64) -> (f64, f64, f64) {
        let width = self.domain.width();
        let lower = -(-d).exp_m1();
        let upper = -(d - width).exp_m1();
        let e_lo = (-d).exp();
        let e_hi = (d - width).exp();

        let (lower_d, lower_dd) = (e_lo, -e_lo);
        let (upper_d, upper_dd) = (-e_hi, -e_hi);

        let h = lower * upper;
        let h_d = lower_d * upper + lower * upper_d;
        let h_dd = lower_dd * upper + 2.0 * lower_d * upper_d + lower * upper_dd;
        (h, h_d, h_dd)
    }
}

impl Ansatz for ExpBoundaryAnsatz {
    fn boundary_factor(&self, p: &Vector2<f64>) -> Result<Jet> {
        if !self.domain.contains(p, DOMAIN_TOLERANCE) {
            return Err(PinnError::PointOutsideDomain {
                x: p.x,
                y: p.y,
                min: self.domain.x_min,
                max: self.domain.x_max,
            });
        }
        let (hx, hx_d, hx_dd) = self.axis_factor(p.x - self.domain.x_min);
        let (hy, hy_d, hy_dd) = self.axis_factor(p.y - self.domain.x_min);
        Ok(Jet::new(hx * hy, hx_d * hy, hx * hy_d, hx_dd * hy, hx * hy_dd))
    }
}

/// Compose wavefunction values from raw network values.
///
/// Value-only convenience over [`Ansatz::compose_psi`]; points must be in the domain.
pub fn compose_psi(domain: &Domain, points: &[Vector2<f64>], raw: &[f64]) -> Result<Vec<f64>> {
    let ansatz = ExpBoundaryAnsatz::new(*domain)?;
    let raw: Vec<Jet> = raw.iter().map(|&n| Jet::constant(n)).collect();
    Ok(ansatz
        .compose_psi(points, &raw)?
        .into_iter()
        .map(|j| j.value)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_ansatz() -> ExpBoundaryAnsatz {
        ExpBoundaryAnsatz::new(Domain::default()).unwrap()
    }

    #[test]
    fn test_psi_vanishes_on_every_edge() {
        let domain = Domain::default();
        let mut edge = Vec::new();
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            edge.push(Vector2::new(0.0, t));
            edge.push(Vector2::new(1.0, t));
            edge.push(Vector2::new(t, 0.0));
            edge.push(Vector2::new(t, 1.0));
        }
        for raw in [1.0, -3.5, 1e6, 0.0] {
            let values = vec![raw; edge.len()];
            let psi = compose_psi(&domain, &edge, &values).unwrap();
            assert!(psi.iter().all(|&v| v == 0.0), "nonzero boundary value for N = {}", raw);
        }
    }

    #[test]
    fn test_psi_vanishes_on_shifted_domain() {
        let domain = Domain::new(-1.0, 2.0).unwrap();
        let edge = [Vector2::new(-1.0, 0.3), Vector2::new(2.0, 1.7), Vector2::new(0.5, -1.0)];
        let psi = compose_psi(&domain, &edge, &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(psi, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_interior_factor_matches_closed_form() {
        let g = unit_ansatz().boundary_factor(&Vector2::new(0.3, 0.6)).unwrap();
        let f = |t: f64| (1.0 - (-t).exp()) * (1.0 - (t - 1.0).exp());
        assert_relative_eq!(g.value, f(0.3) * f(0.6), epsilon = 1e-14);
        assert!(g.value > 0.0);
    }

    #[test]
    fn test_factor_derivatives_match_finite_differences() {
        let ansatz = unit_ansatz();
        let h = 1e-4;
        let p = Vector2::new(0.27, 0.81);
        let g = |q: Vector2<f64>| ansatz.boundary_factor(&q).unwrap().value;
        let jet = ansatz.boundary_factor(&p).unwrap();
        let ex = Vector2::new(h, 0.0);
        let ey = Vector2::new(0.0, h);

        assert_relative_eq!(jet.dx, (g(p + ex) - g(p - ex)) / (2.0 * h), epsilon = 1e-7);
        assert_relative_eq!(jet.dy, (g(p + ey) - g(p - ey)) / (2.0 * h), epsilon = 1e-7);
        assert_relative_eq!(jet.dxx, (g(p + ex) - 2.0 * g(p) + g(p - ex)) / (h * h), epsilon = 1e-5);
        assert_relative_eq!(jet.dyy, (g(p + ey) - 2.0 * g(p) + g(p - ey)) / (h * h), epsilon = 1e-5);
    }

    #[test]
    fn test_rejects_points_outside_domain() {
        let ansatz = unit_ansatz();
        let err = ansatz.boundary_factor(&Vector2::new(1.5, 0.5)).unwrap_err();
        assert!(matches!(err, PinnError::PointOutsideDomain { .. }));
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let ansatz = unit_ansatz();
        let points = [Vector2::new(0.5, 0.5)];
        let raw = [Jet::constant(1.0), Jet::constant(2.0)];
        assert!(matches!(
            ansatz.compose_psi(&points, &raw),
            Err(PinnError::ShapeMismatch { expected: 1, got: 2 })
        ));
    }
}
