//! Training module - the eigenvalue-problem PINN and its history.

mod history;
mod model;

pub use history::{EigenCandidate, History, IterationRecord, StageSummary};
pub use model::{EigenvalueProblemModel, ModelConfig, TrainParams, TrainingReport};
