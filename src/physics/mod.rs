//! Physics module - ansatz, residual and eigenvalue schedule for the square well.

mod ansatz;
mod residual;
mod schedule;
mod traits;

pub use ansatz::{compose_psi, ExpBoundaryAnsatz};
pub use residual::{pde_loss, SchrodingerResidual};
pub use schedule::{driver, StagedSchedule};
pub use traits::{Ansatz, EigenvalueSchedule, ResidualLoss};
