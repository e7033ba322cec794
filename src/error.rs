//! Error type shared by every stage of the PINN pipeline.

use thiserror::Error;

/// Errors returned by grid generation, field evaluation and training.
#[derive(Debug, Error)]
pub enum PinnError {
    /// A grid needs at least two nodes per axis to span the domain.
    #[error("grid resolution must be at least 2; got {0}")]
    InvalidResolution(usize),

    /// Two batches that must align point-for-point have different lengths.
    #[error("shape mismatch: expected {expected} entries, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The residual was asked to average over zero points.
    #[error("cannot evaluate the residual over an empty batch")]
    EmptyBatch,

    /// A collocation point lies outside the domain the ansatz is defined on.
    #[error("point ({x:.6}, {y:.6}) lies outside [{min}, {max}]^2")]
    PointOutsideDomain { x: f64, y: f64, min: f64, max: f64 },

    /// The loss became NaN or infinite.
    #[error("training diverged at iteration {iteration} (loss = {loss})")]
    Diverged { iteration: usize, loss: f64 },

    /// A parameter set was rejected before any computation began.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PinnError>;
