//! IO module - configuration handling for training runs.

mod config;

pub use config::{read_run_config, GridConfig, RunConfig, SamplerConfig};
