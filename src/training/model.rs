//! Eigenvalue-problem training loop.
//!
//! Each iteration resamples collocation points, evaluates the network jets,
//! composes the boundary ansatz, measures the mean squared residual at the
//! scheduled trial eigenvalue and takes one Adam step on the network weights.
//! Stages of the schedule are summarised as they complete; stages whose tail
//! loss settles below the required threshold become eigenvalue candidates.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::history::{EigenCandidate, History, StageSummary};
use crate::domain::CollocationSampler;
use crate::error::{PinnError, Result};
use crate::network::{Activation, Adam, JetMatrix, Mlp};
use crate::physics::{Ansatz, EigenvalueSchedule, ResidualLoss};

/// Network and optimiser settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub layers: Vec<usize>,
    pub activation: Activation,
    pub learning_rate: f64,
    pub start_eigenvalue: f64,
    /// Seed for weight initialisation; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            layers: vec![2, 20, 20, 1],
            activation: Activation::Sin,
            learning_rate: 1e-4,
            start_eigenvalue: 9.0,
            seed: None,
        }
    }
}

/// Iteration budget and stage convergence criteria.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub total_iterations: usize,
    /// A stage converges only if its tail loss is at most this.
    pub max_required_loss: f64,
    /// Largest relative change between the last two tail windows of a converged stage.
    pub rtol: f64,
    /// Tail window length is `stage_length / fraction`.
    pub fraction: usize,
    /// Emit a debug event every this many iterations; 0 disables.
    pub log_interval: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            total_iterations: 125_000,
            max_required_loss: 1e-2,
            rtol: 0.01,
            fraction: 6,
            log_interval: 1000,
        }
    }
}

impl TrainParams {
    pub fn validate(&self, stage_length: usize) -> Result<()> {
        if stage_length == 0 {
            return Err(PinnError::InvalidConfig("stage length must be positive".to_string()));
        }
        if self.fraction < 2 {
            return Err(PinnError::InvalidConfig(format!(
                "fraction must be at least 2 to compare two tail windows; got {}",
                self.fraction
            )));
        }
        if stage_length / self.fraction == 0 {
            return Err(PinnError::InvalidConfig(format!(
                "stage length {} is shorter than fraction {}",
                stage_length, self.fraction
            )));
        }
        if !(self.max_required_loss >= 0.0) || !(self.rtol >= 0.0) {
            return Err(PinnError::InvalidConfig(format!(
                "loss threshold and rtol must be non-negative; got {} and {}",
                self.max_required_loss, self.rtol
            )));
        }
        Ok(())
    }
}

/// Outcome of [`EigenvalueProblemModel::train`].
#[derive(Clone, Debug)]
pub struct TrainingReport {
    pub final_loss: f64,
    /// Converged stage with the lowest tail loss.
    pub best: Option<EigenCandidate>,
    pub candidates: Vec<EigenCandidate>,
    pub stages: Vec<StageSummary>,
}

/// PINN for `ψ = g · N` with a pluggable ansatz and residual.
pub struct EigenvalueProblemModel<A: Ansatz, R: ResidualLoss> {
    network: Mlp,
    ansatz: A,
    residual: R,
    optimizer: Adam,
    eigenvalue: f64,
    history: History,
}

impl<A: Ansatz, R: ResidualLoss> EigenvalueProblemModel<A, R> {
    pub fn new(config: &ModelConfig, ansatz: A, residual: R) -> Result<Self> {
        if config.layers.last() != Some(&1) {
            return Err(PinnError::InvalidConfig(format!(
                "output layer must have width 1; got {:?}",
                config.layers
            )));
        }
        if !(config.learning_rate > 0.0) {
            return Err(PinnError::InvalidConfig(format!(
                "learning rate must be positive; got {}",
                config.learning_rate
            )));
        }
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let network = Mlp::new(&config.layers, config.activation, &mut rng)?;
        let optimizer = Adam::new(network.num_params(), config.learning_rate);
        Ok(Self {
            network,
            ansatz,
            residual,
            optimizer,
            eigenvalue: config.start_eigenvalue,
            history: History::new(),
        })
    }

    pub fn network(&self) -> &Mlp {
        &self.network
    }

    /// Trial eigenvalue of the most recent iteration, or the start value.
    pub fn eigenvalue(&self) -> f64 {
        self.eigenvalue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Wavefunction values at `points`.
    pub fn psi(&self, points: &[Vector2<f64>]) -> Result<Vec<f64>> {
        let raw = self.network.forward_jet(points).0.row_jets(0);
        Ok(self
            .ansatz
            .compose_psi(points, &raw)?
            .into_iter()
            .map(|j| j.value)
            .collect())
    }

    /// Residual loss at `points` for trial eigenvalue `energy`, without training.
    pub fn evaluate_loss(&self, points: &[Vector2<f64>], energy: f64) -> Result<f64> {
        let raw = self.network.forward_jet(points).0.row_jets(0);
        let psi = self.ansatz.compose_psi(points, &raw)?;
        self.residual.pde_loss(&psi, energy)
    }

    /// One gradient step at `points`. Returns the loss before the update.
    ///
    /// A non-finite loss is returned as is and leaves the weights untouched.
    pub fn step(&mut self, points: &[Vector2<f64>], energy: f64) -> Result<f64> {
        let (out, tape) = self.network.forward_jet(points);
        let raw = out.row_jets(0);
        let factors = self.ansatz.boundary_factors(points)?;
        let psi: Vec<_> = factors.iter().zip(&raw).map(|(g, n)| g.mul(n)).collect();

        let (loss, psi_seed) = self.residual.pde_loss_with_grad(&psi, energy)?;
        if !loss.is_finite() {
            return Ok(loss);
        }

        let raw_seed: Vec<_> = factors
            .iter()
            .zip(&psi_seed)
            .map(|(g, s)| g.mul_adjoint(s))
            .collect();
        let grads = self
            .network
            .backward_jet(&tape, &JetMatrix::from_row_jets(&raw_seed))
            .flatten();

        let mut params = self.network.get_params();
        self.optimizer.step(&mut params, &grads)?;
        self.network.set_params(&params)?;
        Ok(loss)
    }

    /// Train for `params.total_iterations` iterations.
    ///
    /// Iterations are numbered globally: a call on a model that already holds
    /// `n` records continues the schedule at `n`, so repeated calls behave like
    /// one long run. Iteration `k` uses `schedule.eigenvalue(k)` and points from
    /// `sampler.perturb(grid)`. Stage `k / stage_length` is summarised when its
    /// last iteration completes, over the records this call produced; a stage
    /// still open when the call returns is summarised if it holds at least two
    /// tail windows.
    pub fn train<S, P>(
        &mut self,
        schedule: &S,
        stage_length: usize,
        grid: &[Vector2<f64>],
        sampler: &mut P,
        params: &TrainParams,
    ) -> Result<TrainingReport>
    where
        S: EigenvalueSchedule + ?Sized,
        P: CollocationSampler + ?Sized,
    {
        params.validate(stage_length)?;
        if grid.is_empty() {
            return Err(PinnError::EmptyBatch);
        }

        let window = stage_length / params.fraction;
        let offset = self.history.len();
        let first_stage = self.history.stages.len();
        let mut final_loss = f64::NAN;

        info!(
            iterations = params.total_iterations,
            stage_length,
            points = grid.len(),
            parameters = self.network.num_params(),
            "starting training"
        );

        for i in 0..params.total_iterations {
            let k = offset + i;
            let energy = schedule.eigenvalue(k);
            self.eigenvalue = energy;
            let points = sampler.perturb(grid);
            let loss = self.step(&points, energy)?;
            if !loss.is_finite() {
                warn!(iteration = k, energy, loss, "loss is not finite, aborting");
                return Err(PinnError::Diverged { iteration: k, loss });
            }
            self.history.push(k, energy, loss);
            final_loss = loss;

            if params.log_interval > 0 && k % params.log_interval == 0 {
                debug!(iteration = k, energy, loss, "training");
            }

            if (k + 1) % stage_length == 0 {
                let end = k + 1;
                let start = (end - stage_length).max(offset);
                self.close_stage(k / stage_length, start..end, window, params);
            }
        }

        let end = offset + params.total_iterations;
        let tail = end % stage_length;
        if tail > 0 && params.total_iterations > 0 {
            let start = (end - tail).max(offset);
            self.close_stage(end / stage_length, start..end, window, params);
        }

        let stages = self.history.stages[first_stage..].to_vec();
        let candidates = self.history.candidates_since(first_stage);
        let best = candidates
            .iter()
            .copied()
            .min_by(|a, b| a.loss.total_cmp(&b.loss));

        match best {
            Some(c) => info!(eigenvalue = c.eigenvalue, loss = c.loss, "best eigenvalue candidate"),
            None => info!(final_loss, "no stage reached the required loss"),
        }

        Ok(TrainingReport { final_loss, best, candidates, stages })
    }

    fn close_stage(&mut self, stage: usize, range: std::ops::Range<usize>, window: usize, params: &TrainParams) {
        if let Some(s) =
            self.history
                .summarise_stage(stage, range, window, params.max_required_loss, params.rtol)
        {
            info!(
                stage = s.stage,
                eigenvalue = s.eigenvalue,
                mean_loss = s.mean_loss,
                drift = s.drift,
                converged = s.converged,
                "stage finished"
            );
        }
    }
}
