//! Domain module - the square box, its collocation grid and point resampling.

mod grid;
mod perturb;

pub use grid::{uniform_grid, Domain};
pub use perturb::{CollocationSampler, ReflectingPerturber};
