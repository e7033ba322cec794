//! YAML run configuration.
//!
//! Every section is optional; missing fields fall back to the reference
//! experiment (unit box, 10 x 10 grid, `[2, 20, 20, 1]` sine network,
//! schedule `9 + 0.25 · floor(i / 3000)`, 125k iterations).
//!
//! ```yaml
//! domain:
//!   x_min: 0.0
//!   x_max: 1.0
//! grid:
//!   resolution: 10
//! model:
//!   layers: [2, 20, 20, 1]
//!   activation: sin
//!   learning_rate: 1.0e-4
//!   start_eigenvalue: 9.0
//! sampler:
//!   sigma: 0.05
//! schedule:
//!   start: 9.0
//!   step: 0.25
//!   stage_length: 3000
//! training:
//!   total_iterations: 125000
//!   max_required_loss: 1.0e-2
//!   rtol: 0.01
//!   fraction: 6
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Domain, ReflectingPerturber};
use crate::error::{PinnError, Result};
use crate::physics::StagedSchedule;
use crate::training::{ModelConfig, TrainParams};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Nodes per axis.
    pub resolution: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { resolution: 10 }
    }
}

/// Collocation jitter settings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub sigma: f64,
    /// Truncation radius of the noise; half the domain width when absent.
    pub max_displacement: Option<f64>,
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { sigma: 0.05, max_displacement: None, seed: None }
    }
}

impl SamplerConfig {
    pub fn validate(&self, domain: &Domain) -> Result<()> {
        if !(self.sigma >= 0.0 && self.sigma.is_finite()) {
            return Err(PinnError::InvalidConfig(format!(
                "sampler sigma must be finite and >= 0; got {}",
                self.sigma
            )));
        }
        if let Some(max) = self.max_displacement {
            if !(max >= 0.0 && max <= domain.width()) {
                return Err(PinnError::InvalidConfig(format!(
                    "sampler max_displacement must lie in [0, {}]; got {}",
                    domain.width(),
                    max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub domain: Domain,
    pub grid: GridConfig,
    pub model: ModelConfig,
    pub sampler: SamplerConfig,
    pub schedule: StagedSchedule,
    pub training: TrainParams,
}

impl RunConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: RunConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        self.domain.validate()?;
        if self.grid.resolution < 2 {
            return Err(PinnError::InvalidResolution(self.grid.resolution));
        }
        self.sampler.validate(&self.domain)?;
        self.schedule.validate()?;
        self.training.validate(self.schedule.stage_length)?;
        Ok(())
    }

    /// Collocation sampler described by the `sampler` section.
    pub fn build_sampler(&self) -> Result<ReflectingPerturber> {
        let mut sampler = ReflectingPerturber::new(self.domain, self.sampler.sigma)?;
        if let Some(max) = self.sampler.max_displacement {
            sampler = sampler.with_max_displacement(max)?;
        }
        if let Some(seed) = self.sampler.seed {
            sampler = sampler.with_seed(seed);
        }
        Ok(sampler)
    }

    pub fn write_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }
}

/// Read and validate a run configuration from a YAML file.
pub fn read_run_config<P: AsRef<Path>>(filename: P) -> Result<RunConfig> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let config: RunConfig = serde_yaml::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}
