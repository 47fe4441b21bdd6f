//! Mathematical utilities: causal series statistics, correlation coefficients,
//! and binomial confidence intervals.

pub mod correlation;
pub mod interval;
pub mod stats;

pub use correlation::*;
pub use interval::*;
pub use stats::*;
