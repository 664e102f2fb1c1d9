//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the conic parameter record (`ConicParams`)
//! - validated input points (`PointSet`)
//! - fit outputs (`FitResult`, `FitQuality`, `FitStats`)
//! - run configuration (`FitConfig`, `ModelChoice`) and the curve-file schema

pub mod types;

pub use types::*;
