//! Conic fitting orchestration.
//!
//! Responsibilities:
//!
//! - derive an initial guess from the raw points
//! - express parameter constraints (bounds / fixed flags)
//! - drive the Levenberg–Marquardt minimizer over the residual model
//! - assemble fit statistics and Hessian-derived uncertainties

pub mod bounds;
pub mod fitter;
pub mod initial;

pub use bounds::*;
pub use fitter::*;
pub use initial::*;
