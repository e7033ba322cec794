//! PINN Well - physics-informed neural network eigen-solver in Rust
//!
//! This crate trains a small multilayer perceptron to approximate low-lying
//! eigenstates of the 2D infinite square well `½ Δψ + E ψ = 0` by minimising
//! the mean squared residual over jittered collocation points. Dirichlet
//! walls are built into the trial form, and the trial eigenvalue follows a
//! staged schedule.

pub mod domain;
pub mod error;
pub mod io;
pub mod network;
pub mod physics;
pub mod training;


// Re-export commonly used types at crate root
pub use domain::{uniform_grid, CollocationSampler, Domain, ReflectingPerturber};
pub use error::{PinnError, Result};
pub use io::{read_run_config, RunConfig};
pub use network::{Activation, Adam, Jet, JetMatrix, Mlp};
pub use physics::{
    compose_psi, driver, pde_loss, Ansatz, EigenvalueSchedule, ExpBoundaryAnsatz, ResidualLoss,
    SchrodingerResidual, StagedSchedule,
};
pub use training::{
    EigenCandidate, EigenvalueProblemModel, History, ModelConfig, StageSummary, TrainParams,
    TrainingReport,
};

/// Exact eigenvalue `E_nm = π² (n² + m²) / (2 L²)` of the well of width `width`.
pub fn exact_eigenvalue(n: u32, m: u32, width: f64) -> f64 {
    let (n, m) = (n as f64, m as f64);
    std::f64::consts::PI.powi(2) * (n * n + m * m) / (2.0 * width * width)
}

/// Assemble the reference model for a run configuration.
pub fn build_model(config: &RunConfig) -> Result<EigenvalueProblemModel<ExpBoundaryAnsatz, SchrodingerResidual>> {
    let ansatz = ExpBoundaryAnsatz::new(config.domain)?;
    EigenvalueProblemModel::new(&config.model, ansatz, SchrodingerResidual::default())
}

/// Build the grid, sampler and model described by `config` and train.
pub fn run(
    config: &RunConfig,
) -> Result<(EigenvalueProblemModel<ExpBoundaryAnsatz, SchrodingerResidual>, TrainingReport)> {
    config.validate()?;
    let grid = uniform_grid(&config.domain, config.grid.resolution)?;
    let mut sampler = config.build_sampler()?;
    let mut model = build_model(config)?;
    let report = model.train(
        &config.schedule,
        config.schedule.stage_length,
        &grid,
        &mut sampler,
        &config.training,
    )?;
    Ok((model, report))
}
