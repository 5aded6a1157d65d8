//! Pure price-series math. No I/O and no state between calls.

pub mod moving_average;
pub mod reversal;
pub mod slope;

pub use moving_average::{exponential_moving_average, simple_moving_average};
pub use reversal::{detect_reversal, latest_signal};
pub use slope::slope;
