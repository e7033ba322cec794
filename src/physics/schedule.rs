//! Staged eigenvalue curriculum.

use serde::{Deserialize, Serialize};

use super::traits::EigenvalueSchedule;
use crate::error::{PinnError, Result};

/// Holds the trial eigenvalue for `stage_length` iterations, then raises it by `step`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagedSchedule {
    pub start: f64,
    pub step: f64,
    pub stage_length: usize,
}

impl Default for StagedSchedule {
    fn default() -> Self {
        Self { start: 9.0, step: 0.25, stage_length: 3000 }
    }
}

impl StagedSchedule {
    pub fn new(start: f64, step: f64, stage_length: usize) -> Result<Self> {
        let schedule = Self { start, step, stage_length };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stage_length == 0 {
            return Err(PinnError::InvalidConfig("stage length must be positive".to_string()));
        }
        if !self.start.is_finite() || !self.step.is_finite() {
            return Err(PinnError::InvalidConfig(format!(
                "schedule start and step must be finite; got {} and {}",
                self.start, self.step
            )));
        }
        Ok(())
    }

    /// Zero-based stage containing `iteration`.
    pub fn stage(&self, iteration: usize) -> usize {
        iteration / self.stage_length
    }
}

impl EigenvalueSchedule for StagedSchedule {
    fn eigenvalue(&self, iteration: usize) -> f64 {
        self.start + self.step * self.stage(iteration) as f64
    }
}

/// Reference curriculum: `9 + 0.25 · floor(index / 3000)`.
pub fn driver(index: usize) -> f64 {
    StagedSchedule::default().eigenvalue(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_stages() {
        for i in [0, 1, 1500, 2999] {
            assert_eq!(driver(i), 9.0);
        }
        for i in [3000, 4500, 5999] {
            assert_eq!(driver(i), 9.25);
        }
        assert_eq!(driver(6000), 9.5);
        assert_eq!(driver(8999), 9.5);
        assert_eq!(driver(9000), 9.75);
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = StagedSchedule::new(4.0, -0.5, 10).unwrap();
        assert_eq!(schedule.eigenvalue(9), 4.0);
        assert_eq!(schedule.eigenvalue(10), 3.5);
        assert_eq!(schedule.stage(35), 3);
    }

    #[test]
    fn test_rejects_empty_stages() {
        assert!(StagedSchedule::new(9.0, 0.25, 0).is_err());
        assert!(StagedSchedule::new(f64::INFINITY, 0.25, 10).is_err());
    }

    #[test]
    fn test_plain_functions_are_schedules() {
        let constant = |_: usize| 2.5;
        assert_eq!(constant.eigenvalue(123), 2.5);
        assert_eq!(EigenvalueSchedule::eigenvalue(&driver, 3000), 9.25);
    }
}
