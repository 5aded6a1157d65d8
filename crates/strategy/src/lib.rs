pub mod differential;
pub mod indicators;

pub use differential::{compute_differential, DifferentialIndicator};
