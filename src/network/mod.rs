//! Network module - MLP with analytic spatial jets, activations and optimiser.

mod activation;
mod adam;
mod jet;
mod mlp;

pub use activation::Activation;
pub use adam::Adam;
pub use jet::{Jet, JetMatrix};
pub use mlp::{Gradients, Layer, Mlp, Tape};
