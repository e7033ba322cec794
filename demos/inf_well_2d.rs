//! PINN eigen-solver for the 2D infinite square well
//!
//! Run with: cargo run --release --example inf_well_2d
//!
//! Trains a [2, 20, 20, 1] sine network on a jittered 10 x 10 grid while the
//! trial eigenvalue climbs 9.0, 9.25, 9.5, ... every 3000 iterations. The
//! residual only settles once the trial value passes the ground state E = π².

use pinn_well::{
    driver, exact_eigenvalue, uniform_grid, Domain, EigenvalueProblemModel, ExpBoundaryAnsatz,
    ModelConfig, ReflectingPerturber, SchrodingerResidual, TrainParams,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    // Simulation parameters
    let domain = Domain::new(0.0, 1.0)?;
    let resolution = 10;          // Nodes per axis
    let sigma = 0.05;             // Collocation jitter
    let stage_length = 3000;      // Iterations per trial eigenvalue
    let params = TrainParams {
        total_iterations: 30_000, // Ten stages: E = 9.0 .. 11.25
        max_required_loss: 1e-2,
        rtol: 0.01,
        fraction: 6,
        log_interval: 1000,
    };
    let config = ModelConfig { seed: Some(2024), ..ModelConfig::default() };

    let grid = uniform_grid(&domain, resolution)?;
    let mut sampler = ReflectingPerturber::new(domain, sigma)?.with_seed(7);
    let ansatz = ExpBoundaryAnsatz::new(domain)?;
    let mut model = EigenvalueProblemModel::new(&config, ansatz, SchrodingerResidual::default())?;

    let report = model.train(&driver, stage_length, &grid, &mut sampler, &params)?;

    println!();
    println!("  stage   E_trial    tail loss     drift   converged");
    for s in &report.stages {
        println!(
            "  {:5}   {:7.3}   {:10.3e}   {:7.4}   {}",
            s.stage, s.eigenvalue, s.mean_loss, s.drift, s.converged
        );
    }
    println!();
    println!("Exact ground state E_11 = π² = {:.4}", exact_eigenvalue(1, 1, domain.width()));
    if let Some(best) = report.best {
        println!("Best candidate: E = {:.4} (loss {:.3e})", best.eigenvalue, best.loss);
    }
    Ok(())
}
