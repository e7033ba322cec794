//! Second-order forward-mode jets over the plane.
//!
//! A jet carries a scalar field's value together with its first partials and
//! its pure second partials at one point. That is exactly what the Laplacian
//! needs, so mixed partials are never formed.

use nalgebra::DMatrix;

/// Value and spatial derivatives of a scalar field at a single point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Jet {
    pub value: f64,
    pub dx: f64,
    pub dy: f64,
    pub dxx: f64,
    pub dyy: f64,
}

impl Jet {
    pub fn new(value: f64, dx: f64, dy: f64, dxx: f64, dyy: f64) -> Self {
        Self { value, dx, dy, dxx, dyy }
    }

    /// A field that does not vary in space.
    pub fn constant(value: f64) -> Self {
        Self { value, ..Self::default() }
    }

    pub fn laplacian(&self) -> f64 {
        self.dxx + self.dyy
    }

    /// Product rule: jet of `self * other`.
    pub fn mul(&self, other: &Jet) -> Jet {
        Jet {
            value: self.value * other.value,
            dx: self.dx * other.value + self.value * other.dx,
            dy: self.dy * other.value + self.value * other.dy,
            dxx: self.dxx * other.value + 2.0 * self.dx * other.dx + self.value * other.dxx,
            dyy: self.dyy * other.value + 2.0 * self.dy * other.dy + self.value * other.dyy,
        }
    }

    /// Adjoint of [`Jet::mul`] with respect to `other`, holding `self` fixed.
    ///
    /// Given the adjoint `seed` of the product, returns the adjoint of `other`.
    pub fn mul_adjoint(&self, seed: &Jet) -> Jet {
        Jet {
            value: self.value * seed.value
                + self.dx * seed.dx
                + self.dy * seed.dy
                + self.dxx * seed.dxx
                + self.dyy * seed.dyy,
            dx: self.value * seed.dx + 2.0 * self.dx * seed.dxx,
            dy: self.value * seed.dy + 2.0 * self.dy * seed.dyy,
            dxx: self.value * seed.dxx,
            dyy: self.value * seed.dyy,
        }
    }
}

/// Jets of a vector-valued layer over a batch, one matrix per component.
///
/// Rows index layer units, columns index points.
#[derive(Clone, Debug, PartialEq)]
pub struct JetMatrix {
    pub value: DMatrix<f64>,
    pub dx: DMatrix<f64>,
    pub dy: DMatrix<f64>,
    pub dxx: DMatrix<f64>,
    pub dyy: DMatrix<f64>,
}

impl JetMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            value: DMatrix::zeros(nrows, ncols),
            dx: DMatrix::zeros(nrows, ncols),
            dy: DMatrix::zeros(nrows, ncols),
            dxx: DMatrix::zeros(nrows, ncols),
            dyy: DMatrix::zeros(nrows, ncols),
        }
    }

    pub fn nrows(&self) -> usize {
        self.value.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.value.ncols()
    }

    /// Extract the jets of one unit across the batch.
    pub fn row_jets(&self, row: usize) -> Vec<Jet> {
        (0..self.ncols())
            .map(|j| Jet {
                value: self.value[(row, j)],
                dx: self.dx[(row, j)],
                dy: self.dy[(row, j)],
                dxx: self.dxx[(row, j)],
                dyy: self.dyy[(row, j)],
            })
            .collect()
    }

    /// Single-row matrix built from per-point jets.
    pub fn from_row_jets(jets: &[Jet]) -> Self {
        let n = jets.len();
        Self {
            value: DMatrix::from_iterator(1, n, jets.iter().map(|j| j.value)),
            dx: DMatrix::from_iterator(1, n, jets.iter().map(|j| j.dx)),
            dy: DMatrix::from_iterator(1, n, jets.iter().map(|j| j.dy)),
            dxx: DMatrix::from_iterator(1, n, jets.iter().map(|j| j.dxx)),
            dyy: DMatrix::from_iterator(1, n, jets.iter().map(|j| j.dyy)),
        }
    }
}
