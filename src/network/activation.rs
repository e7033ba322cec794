//! Hidden-layer activations and their first three derivatives.

use serde::{Deserialize, Serialize};

/// Smooth activation applied elementwise on hidden layers.
///
/// The third derivative is required because the loss depends on second
/// spatial derivatives of the network, and backpropagating through those
/// differentiates the activation once more.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Sin,
    Tanh,
}

impl Activation {
    /// Returns `(σ, σ', σ'', σ''')` evaluated at `z`.
    pub fn derivatives(self, z: f64) -> [f64; 4] {
        match self {
            Activation::Sin => {
                let (s, c) = z.sin_cos();
                [s, c, -s, -c]
            }
            Activation::Tanh => {
                let t = z.tanh();
                let sech2 = 1.0 - t * t;
                [t, sech2, -2.0 * t * sech2, sech2 * (6.0 * t * t - 2.0)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derivatives_match_finite_differences() {
        let h = 1e-5;
        for act in [Activation::Sin, Activation::Tanh] {
            for &z in &[-1.3, -0.2, 0.0, 0.4, 2.1] {
                let d = act.derivatives(z);
                let fwd = act.derivatives(z + h);
                let bwd = act.derivatives(z - h);
                for k in 0..3 {
                    let numeric = (fwd[k] - bwd[k]) / (2.0 * h);
                    assert_relative_eq!(d[k + 1], numeric, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_parses_lowercase_names() {
        let act: Activation = serde_yaml::from_str("tanh").unwrap();
        assert_eq!(act, Activation::Tanh);
        assert_eq!(Activation::default(), Activation::Sin);
    }
}
