//! Training history: per-iteration losses and per-stage convergence summaries.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Loss observed at one training iteration.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub eigenvalue: f64,
    pub loss: f64,
}

/// Tail statistics of one stage of the eigenvalue schedule.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: usize,
    pub eigenvalue: f64,
    /// Mean loss over the last window of the stage.
    pub mean_loss: f64,
    /// Relative change between the means of the last two windows.
    pub drift: f64,
    pub converged: bool,
}

/// A trial eigenvalue at which the residual settled below the required loss.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EigenCandidate {
    pub stage: usize,
    pub eigenvalue: f64,
    pub loss: f64,
}

impl From<&StageSummary> for EigenCandidate {
    fn from(s: &StageSummary) -> Self {
        Self { stage: s.stage, eigenvalue: s.eigenvalue, loss: s.mean_loss }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    pub records: Vec<IterationRecord>,
    pub stages: Vec<StageSummary>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, iteration: usize, eigenvalue: f64, loss: f64) {
        self.records.push(IterationRecord { iteration, eigenvalue, loss });
    }

    /// Summarise the records in `range` as stage `stage`.
    ///
    /// The stage converged when the mean of its last `window` losses is at most
    /// `max_required_loss` and differs from the mean of the window before it by
    /// at most `rtol` relative. Returns `None` if the range holds fewer than two
    /// windows.
    pub fn summarise_stage(
        &mut self,
        stage: usize,
        range: std::ops::Range<usize>,
        window: usize,
        max_required_loss: f64,
        rtol: f64,
    ) -> Option<StageSummary> {
        let records = self.records.get(range)?;
        if window == 0 || records.len() < 2 * window {
            return None;
        }
        let losses: Vec<f64> = records.iter().map(|r| r.loss).collect();
        let n = losses.len();
        let tail = mean(&losses[n - window..]);
        let previous = mean(&losses[n - 2 * window..n - window]);
        let drift = (tail - previous).abs() / previous.abs().max(f64::MIN_POSITIVE);

        let summary = StageSummary {
            stage,
            eigenvalue: records[n - 1].eigenvalue,
            mean_loss: tail,
            drift,
            converged: tail <= max_required_loss && drift <= rtol,
        };
        self.stages.push(summary);
        Some(summary)
    }

    /// Converged stages, in training order.
    pub fn candidates(&self) -> Vec<EigenCandidate> {
        self.candidates_since(0)
    }

    /// Converged stages among those summarised from index `first` on.
    pub fn candidates_since(&self, first: usize) -> Vec<EigenCandidate> {
        self.stages
            .get(first..)
            .unwrap_or_default()
            .iter()
            .filter(|s| s.converged)
            .map(EigenCandidate::from)
            .collect()
    }

    /// Dump the whole history as YAML.
    pub fn write_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn history_from(losses: &[f64]) -> History {
        let mut history = History::new();
        for (i, &l) in losses.iter().enumerate() {
            history.push(i, 9.5, l);
        }
        history
    }

    #[test]
    fn test_flat_low_loss_stage_converges() {
        let mut history = history_from(&[0.5, 0.2, 0.004, 0.004, 0.004, 0.004]);
        let s = history.summarise_stage(0, 0..6, 2, 1e-2, 0.01).unwrap();
        assert!(s.converged);
        assert_relative_eq!(s.mean_loss, 0.004, epsilon = 1e-15);
        assert_relative_eq!(s.drift, 0.0, epsilon = 1e-12);
        assert_eq!(history.candidates(), vec![EigenCandidate { stage: 0, eigenvalue: 9.5, loss: s.mean_loss }]);
    }

    #[test]
    fn test_drifting_stage_is_not_converged() {
        let mut history = history_from(&[0.008, 0.008, 0.004, 0.004]);
        let s = history.summarise_stage(0, 0..4, 2, 1e-2, 0.01).unwrap();
        assert!(!s.converged);
        assert_relative_eq!(s.drift, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_high_loss_stage_is_not_converged() {
        let mut history = history_from(&[1.0; 8]);
        let s = history.summarise_stage(3, 0..8, 4, 1e-2, 0.01).unwrap();
        assert_eq!(s.stage, 3);
        assert!(!s.converged);
        assert!(history.candidates().is_empty());
    }

    #[test]
    fn test_candidates_since_skips_earlier_stages() {
        let mut history = history_from(&[0.004; 8]);
        history.summarise_stage(0, 0..4, 2, 1e-2, 0.01);
        history.summarise_stage(1, 4..8, 2, 1e-2, 0.01);
        assert_eq!(history.candidates().len(), 2);
        let later = history.candidates_since(1);
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].stage, 1);
        assert!(history.candidates_since(5).is_empty());
    }

    #[test]
    fn test_short_range_has_no_summary() {
        let mut history = history_from(&[1.0, 1.0, 1.0]);
        assert!(history.summarise_stage(0, 0..3, 2, 1.0, 1.0).is_none());
        assert!(history.summarise_stage(0, 0..10, 1, 1.0, 1.0).is_none());
        assert!(history.stages.is_empty());
    }

    #[test]
    fn test_yaml_export() {
        let mut history = history_from(&[0.1, 0.05]);
        history.summarise_stage(0, 0..2, 1, 1.0, 1.0);
        let path = std::env::temp_dir().join(format!("pinn_well_history_{}.yml", std::process::id()));
        history.write_yaml(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: History = serde_yaml::from_str(&text).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back.records, history.records);
        assert_eq!(back.stages.len(), 1);
    }
}
