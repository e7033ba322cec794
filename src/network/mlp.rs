//! Fully connected network over the plane with exact spatial derivatives.
//!
//! The forward pass pushes second-order jets through every layer, so the
//! output comes with its gradient and Laplacian without finite differences.
//! The backward pass is the hand-derived adjoint of that jet forward pass and
//! yields parameter gradients of any scalar built from the output jets.

use nalgebra::{DMatrix, DVector, Vector2};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use super::activation::Activation;
use super::jet::JetMatrix;
use crate::error::{PinnError, Result};

/// Dense layer `z = W a + b`.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Shape `(n_out, n_in)`.
    pub weights: DMatrix<f64>,
    pub bias: DVector<f64>,
}

impl Layer {
    /// Xavier-uniform weights, zero bias.
    fn xavier<R: Rng + ?Sized>(n_in: usize, n_out: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (n_in + n_out) as f64).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        Self {
            weights: DMatrix::from_fn(n_out, n_in, |_, _| dist.sample(&mut *rng)),
            bias: DVector::zeros(n_out),
        }
    }

    fn apply(&self, a: &JetMatrix) -> JetMatrix {
        let mut value = &self.weights * &a.value;
        for j in 0..value.ncols() {
            for i in 0..value.nrows() {
                value[(i, j)] += self.bias[i];
            }
        }
        JetMatrix {
            value,
            dx: &self.weights * &a.dx,
            dy: &self.weights * &a.dy,
            dxx: &self.weights * &a.dxx,
            dyy: &self.weights * &a.dyy,
        }
    }
}

/// Intermediate jets recorded by [`Mlp::forward_jet`] for the backward pass.
pub struct Tape {
    /// Input jets of every layer.
    inputs: Vec<JetMatrix>,
    /// Pre-activation jets of every hidden layer.
    pre_activations: Vec<JetMatrix>,
}

/// Parameter gradients, laid out like the network's layers.
#[derive(Clone, Debug)]
pub struct Gradients {
    pub weights: Vec<DMatrix<f64>>,
    pub biases: Vec<DVector<f64>>,
}

impl Gradients {
    /// Flatten in the same order as [`Mlp::get_params`].
    pub fn flatten(&self) -> DVector<f64> {
        let mut flat = Vec::new();
        for (w, b) in self.weights.iter().zip(&self.biases) {
            flat.extend(w.iter());
            flat.extend(b.iter());
        }
        DVector::from_vec(flat)
    }
}

/// Multilayer perceptron mapping `(x, y)` to a vector of outputs.
#[derive(Clone, Debug)]
pub struct Mlp {
    layers: Vec<Layer>,
    activation: Activation,
}

impl Mlp {
    /// Build a network with the given layer widths, e.g. `[2, 20, 20, 1]`.
    pub fn new<R: Rng + ?Sized>(sizes: &[usize], activation: Activation, rng: &mut R) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(PinnError::InvalidConfig(format!(
                "a network needs at least an input and an output layer; got {:?}",
                sizes
            )));
        }
        if sizes[0] != 2 {
            return Err(PinnError::InvalidConfig(format!(
                "input layer must have width 2 for (x, y); got {}",
                sizes[0]
            )));
        }
        if sizes.iter().any(|&s| s == 0) {
            return Err(PinnError::InvalidConfig(format!("layer widths must be positive; got {:?}", sizes)));
        }
        let layers = sizes
            .windows(2)
            .map(|w| Layer::xavier(w[0], w[1], &mut *rng))
            .collect();
        Ok(Self { layers, activation })
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.bias.len())
    }

    /// Total number of trainable parameters.
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.bias.len()).sum()
    }

    /// All weights and biases, layer by layer, weights in column-major order.
    pub fn get_params(&self) -> DVector<f64> {
        let mut flat = Vec::with_capacity(self.num_params());
        for layer in &self.layers {
            flat.extend(layer.weights.iter());
            flat.extend(layer.bias.iter());
        }
        DVector::from_vec(flat)
    }

    pub fn set_params(&mut self, params: &DVector<f64>) -> Result<()> {
        if params.len() != self.num_params() {
            return Err(PinnError::ShapeMismatch { expected: self.num_params(), got: params.len() });
        }
        let mut offset = 0;
        for layer in &mut self.layers {
            for w in layer.weights.iter_mut() {
                *w = params[offset];
                offset += 1;
            }
            for b in layer.bias.iter_mut() {
                *b = params[offset];
                offset += 1;
            }
        }
        Ok(())
    }

    /// Seed jets for the coordinates themselves: `∂x/∂x = 1`, `∂y/∂y = 1`.
    fn input_jets(points: &[Vector2<f64>]) -> JetMatrix {
        let n = points.len();
        let mut jets = JetMatrix::zeros(2, n);
        for (j, p) in points.iter().enumerate() {
            jets.value[(0, j)] = p.x;
            jets.value[(1, j)] = p.y;
            jets.dx[(0, j)] = 1.0;
            jets.dy[(1, j)] = 1.0;
        }
        jets
    }

    fn activate(&self, z: &JetMatrix) -> JetMatrix {
        let mut h = JetMatrix::zeros(z.nrows(), z.ncols());
        for j in 0..z.ncols() {
            for i in 0..z.nrows() {
                let [s0, s1, s2, _] = self.activation.derivatives(z.value[(i, j)]);
                let (zx, zy) = (z.dx[(i, j)], z.dy[(i, j)]);
                h.value[(i, j)] = s0;
                h.dx[(i, j)] = s1 * zx;
                h.dy[(i, j)] = s1 * zy;
                h.dxx[(i, j)] = s2 * zx * zx + s1 * z.dxx[(i, j)];
                h.dyy[(i, j)] = s2 * zy * zy + s1 * z.dyy[(i, j)];
            }
        }
        h
    }

    /// Adjoint of [`Mlp::activate`]: maps output seeds back to pre-activation seeds.
    fn activate_adjoint(&self, z: &JetMatrix, g: &JetMatrix) -> JetMatrix {
        let mut gz = JetMatrix::zeros(z.nrows(), z.ncols());
        for j in 0..z.ncols() {
            for i in 0..z.nrows() {
                let [_, s1, s2, s3] = self.activation.derivatives(z.value[(i, j)]);
                let (zx, zy) = (z.dx[(i, j)], z.dy[(i, j)]);
                let (zxx, zyy) = (z.dxx[(i, j)], z.dyy[(i, j)]);
                let (gv, gx, gy) = (g.value[(i, j)], g.dx[(i, j)], g.dy[(i, j)]);
                let (gxx, gyy) = (g.dxx[(i, j)], g.dyy[(i, j)]);

                gz.value[(i, j)] = gv * s1
                    + gx * s2 * zx
                    + gy * s2 * zy
                    + gxx * (s3 * zx * zx + s2 * zxx)
                    + gyy * (s3 * zy * zy + s2 * zyy);
                gz.dx[(i, j)] = gx * s1 + 2.0 * gxx * s2 * zx;
                gz.dy[(i, j)] = gy * s1 + 2.0 * gyy * s2 * zy;
                gz.dxx[(i, j)] = gxx * s1;
                gz.dyy[(i, j)] = gyy * s1;
            }
        }
        gz
    }

    /// Network outputs and their spatial derivatives at every point.
    pub fn forward_jet(&self, points: &[Vector2<f64>]) -> (JetMatrix, Tape) {
        let last = self.layers.len() - 1;
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(last);
        let mut a = Self::input_jets(points);

        for (l, layer) in self.layers.iter().enumerate() {
            let z = layer.apply(&a);
            inputs.push(a);
            if l == last {
                return (z, Tape { inputs, pre_activations });
            }
            a = self.activate(&z);
            pre_activations.push(z);
        }
        unreachable!("network has at least one layer")
    }

    /// Output values only.
    pub fn forward(&self, points: &[Vector2<f64>]) -> DMatrix<f64> {
        self.forward_jet(points).0.value
    }

    /// Parameter gradients of a scalar `S` given `seed = ∂S/∂(output jets)`.
    pub fn backward_jet(&self, tape: &Tape, seed: &JetMatrix) -> Gradients {
        let n_layers = self.layers.len();
        let mut weights = vec![DMatrix::zeros(0, 0); n_layers];
        let mut biases = vec![DVector::zeros(0); n_layers];
        let mut g = seed.clone();

        for l in (0..n_layers).rev() {
            let a = &tape.inputs[l];
            let layer = &self.layers[l];
            weights[l] = &g.value * a.value.transpose()
                + &g.dx * a.dx.transpose()
                + &g.dy * a.dy.transpose()
                + &g.dxx * a.dxx.transpose()
                + &g.dyy * a.dyy.transpose();
            biases[l] = g.value.column_sum();

            if l == 0 {
                break;
            }
            let wt = layer.weights.transpose();
            let ga = JetMatrix {
                value: &wt * &g.value,
                dx: &wt * &g.dx,
                dy: &wt * &g.dy,
                dxx: &wt * &g.dxx,
                dyy: &wt * &g.dyy,
            };
            g = self.activate_adjoint(&tape.pre_activations[l - 1], &ga);
        }

        Gradients { weights, biases }
    }
}
