//! Conic-section model implementation.
//!
//! The model is implemented as small, pure functions so that fitting/search
//! code (and external samplers) can stay generic.

pub mod conic;

pub use conic::*;
