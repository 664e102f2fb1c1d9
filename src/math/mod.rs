//! Mathematical utilities: order statistics, circular means, and covariance
//! extraction from a Jacobian.

pub mod circular;
pub mod covariance;
pub mod stats;

pub use circular::*;
pub use covariance::*;
pub use stats::*;
