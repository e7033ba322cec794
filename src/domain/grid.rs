//! Square domain and uniform tensor-product collocation grid.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{PinnError, Result};

/// Square box `[x_min, x_max]^2`. Both axes share the same bounds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    pub x_min: f64,
    pub x_max: f64,
}

impl Default for Domain {
    fn default() -> Self {
        Self { x_min: 0.0, x_max: 1.0 }
    }
}

impl Domain {
    pub fn new(x_min: f64, x_max: f64) -> Result<Self> {
        let domain = Self { x_min, x_max };
        domain.validate()?;
        Ok(domain)
    }

    /// Reject empty, inverted or non-finite boxes.
    pub fn validate(&self) -> Result<()> {
        if !self.x_min.is_finite() || !self.x_max.is_finite() || self.x_max <= self.x_min {
            return Err(PinnError::InvalidConfig(format!(
                "domain bounds must satisfy x_min < x_max; got [{}, {}]",
                self.x_min, self.x_max
            )));
        }
        Ok(())
    }

    /// Side length `L`.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Whether `p` lies in the closed box, allowing `tol` of slack on each side.
    pub fn contains(&self, p: &Vector2<f64>, tol: f64) -> bool {
        p.iter()
            .all(|&c| c >= self.x_min - tol && c <= self.x_max + tol)
    }

    /// `n` evenly spaced nodes from `x_min` to `x_max` inclusive.
    fn linspace(&self, n: usize) -> Vec<f64> {
        let h = self.width() / (n - 1) as f64;
        (0..n)
            .map(|i| if i == n - 1 { self.x_max } else { self.x_min + i as f64 * h })
            .collect()
    }
}

/// Build a `resolution x resolution` mesh over the domain, flattened in
/// "ij" order: the x coordinate is the slow index, y the fast one.
pub fn uniform_grid(domain: &Domain, resolution: usize) -> Result<Vec<Vector2<f64>>> {
    domain.validate()?;
    if resolution < 2 {
        return Err(PinnError::InvalidResolution(resolution));
    }
    let nodes = domain.linspace(resolution);
    let mut grid = Vec::with_capacity(resolution * resolution);
    for &x in &nodes {
        for &y in &nodes {
            grid.push(Vector2::new(x, y));
        }
    }
    Ok(grid)
}
