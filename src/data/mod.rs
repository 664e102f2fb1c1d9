//! Input data sources: the built-in demonstration arc and seeded synthetic
//! arc generation.

pub mod sample;

pub use sample::*;
