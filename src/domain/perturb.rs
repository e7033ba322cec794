//! Stochastic resampling of collocation points.
//!
//! Every training iteration jitters the base grid with bounded Gaussian noise
//! and mirror-reflects coordinates that leave the box, so the network never
//! sees the same mesh twice.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::grid::Domain;
use crate::error::{PinnError, Result};

/// Source of collocation points for one training iteration.
pub trait CollocationSampler {
    /// Produce this iteration's points from the base grid.
    fn perturb(&mut self, grid: &[Vector2<f64>]) -> Vec<Vector2<f64>>;
}

impl<F> CollocationSampler for F
where
    F: FnMut(&[Vector2<f64>]) -> Vec<Vector2<f64>>,
{
    fn perturb(&mut self, grid: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
        self(grid)
    }
}

/// Draws outside the truncation radius are redrawn at most this many times
/// before falling back to a uniform draw inside the radius.
const MAX_REDRAWS: usize = 64;

/// Gaussian jitter with single mirror reflection at the walls.
#[derive(Clone, Debug)]
pub struct ReflectingPerturber {
    domain: Domain,
    sigma: f64,
    max_displacement: f64,
    normal: Normal<f64>,
    rng: StdRng,
}

impl ReflectingPerturber {
    /// Noise with standard deviation `sigma`, truncated to half the domain width.
    pub fn new(domain: Domain, sigma: f64) -> Result<Self> {
        domain.validate()?;
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(PinnError::InvalidConfig(format!(
                "noise scale must be finite and >= 0; got {}",
                sigma
            )));
        }
        let normal = Normal::new(0.0, sigma)
            .map_err(|e| PinnError::InvalidConfig(format!("noise scale {}: {}", sigma, e)))?;
        Ok(Self {
            domain,
            sigma,
            max_displacement: 0.5 * domain.width(),
            normal,
            rng: StdRng::from_entropy(),
        })
    }

    /// Change the truncation radius of the noise.
    ///
    /// A single reflection only restores containment when no displacement
    /// exceeds the domain width, so larger radii are rejected.
    pub fn with_max_displacement(mut self, max_displacement: f64) -> Result<Self> {
        if !(max_displacement >= 0.0 && max_displacement <= self.domain.width()) {
            return Err(PinnError::InvalidConfig(format!(
                "max displacement must lie in [0, {}]; got {}",
                self.domain.width(),
                max_displacement
            )));
        }
        self.max_displacement = max_displacement;
        Ok(self)
    }

    /// Reseed the noise source for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    fn reflect(&self, c: f64) -> f64 {
        if c < self.domain.x_min {
            2.0 * self.domain.x_min - c
        } else if c > self.domain.x_max {
            2.0 * self.domain.x_max - c
        } else {
            c
        }
    }

    /// One draw from the Gaussian truncated to `[-max_displacement, max_displacement]`.
    ///
    /// When the radius is many sigmas narrow the truncated density is flat,
    /// so a uniform draw stands in once the redraw budget runs out.
    fn noise(&mut self) -> f64 {
        let max = self.max_displacement;
        if max == 0.0 {
            return 0.0;
        }
        for _ in 0..MAX_REDRAWS {
            let n = self.normal.sample(&mut self.rng);
            if n.abs() <= max {
                return n;
            }
        }
        self.rng.gen_range(-max..=max)
    }

    fn jitter(&mut self, c: f64) -> f64 {
        let noise = self.noise();
        self.reflect(c + noise)
    }
}

impl CollocationSampler for ReflectingPerturber {
    fn perturb(&mut self, grid: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
        grid.iter()
            .map(|p| {
                let x = self.jitter(p.x);
                let y = self.jitter(p.y);
                Vector2::new(x, y)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::uniform_grid;

    #[test]
    fn test_perturbed_points_stay_in_domain() {
        let domain = Domain::default();
        let grid = uniform_grid(&domain, 10).unwrap();
        let mut perturber = ReflectingPerturber::new(domain, 0.3).unwrap().with_seed(7);
        for _ in 0..200 {
            for p in perturber.perturb(&grid) {
                assert!(domain.contains(&p, 0.0), "point {:?} escaped the box", p);
            }
        }
    }

    #[test]
    fn test_containment_on_shifted_domain() {
        let domain = Domain::new(-2.0, 3.0).unwrap();
        let grid = uniform_grid(&domain, 6).unwrap();
        let mut perturber = ReflectingPerturber::new(domain, 4.0)
            .unwrap()
            .with_max_displacement(5.0)
            .unwrap()
            .with_seed(11);
        for _ in 0..100 {
            assert!(perturber.perturb(&grid).iter().all(|p| domain.contains(p, 0.0)));
        }
    }

    #[test]
    fn test_reflection_mirrors_at_walls() {
        let perturber = ReflectingPerturber::new(Domain::default(), 0.05).unwrap();
        assert_eq!(perturber.reflect(-0.1), 0.1);
        assert_eq!(perturber.reflect(1.25), 0.75);
        assert_eq!(perturber.reflect(0.4), 0.4);
    }

    #[test]
    fn test_noise_actually_moves_points() {
        let domain = Domain::default();
        let grid = uniform_grid(&domain, 10).unwrap();
        let mut perturber = ReflectingPerturber::new(domain, 0.05).unwrap().with_seed(3);
        let moved = perturber.perturb(&grid);
        assert_eq!(moved.len(), grid.len());
        assert!(moved.iter().zip(&grid).any(|(a, b)| a != b));
    }

    #[test]
    fn test_seeded_perturbers_agree() {
        let domain = Domain::default();
        let grid = uniform_grid(&domain, 4).unwrap();
        let mut a = ReflectingPerturber::new(domain, 0.1).unwrap().with_seed(42);
        let mut b = ReflectingPerturber::new(domain, 0.1).unwrap().with_seed(42);
        assert_eq!(a.perturb(&grid), b.perturb(&grid));
    }

    #[test]
    fn test_rejects_bad_noise_settings() {
        for sigma in [-1.0, -1e-9, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    ReflectingPerturber::new(Domain::default(), sigma),
                    Err(PinnError::InvalidConfig(_))
                ),
                "sigma {} was accepted",
                sigma
            );
        }
        assert!(ReflectingPerturber::new(Domain::default(), 0.0).is_ok());
        let p = ReflectingPerturber::new(Domain::default(), 0.1).unwrap();
        assert!(p.with_max_displacement(1.5).is_err());
    }

    #[test]
    fn test_noise_is_truncated_not_clamped() {
        let mut perturber = ReflectingPerturber::new(Domain::default(), 0.3)
            .unwrap()
            .with_max_displacement(0.05)
            .unwrap()
            .with_seed(9);
        let draws: Vec<f64> = (0..10_000).map(|_| perturber.noise()).collect();
        assert!(draws.iter().all(|n| n.abs() <= 0.05));
        // Clamping would pile most of the mass onto the bound.
        assert_eq!(draws.iter().filter(|n| n.abs() == 0.05).count(), 0);
        let inner = draws.iter().filter(|n| n.abs() < 0.04).count();
        assert!(inner > 7_000, "only {} draws inside 0.04", inner);
    }

    #[test]
    fn test_zero_radius_leaves_points_fixed() {
        let domain = Domain::default();
        let grid = uniform_grid(&domain, 5).unwrap();
        let mut perturber = ReflectingPerturber::new(domain, 0.2)
            .unwrap()
            .with_max_displacement(0.0)
            .unwrap()
            .with_seed(1);
        assert_eq!(perturber.perturb(&grid), grid);
    }

    #[test]
    fn test_closure_sampler() {
        let grid = vec![Vector2::new(0.25, 0.75)];
        let mut identity = |g: &[Vector2<f64>]| g.to_vec();
        assert_eq!(identity.perturb(&grid), grid);
    }
}
