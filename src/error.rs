//! Error taxonomy for the fitting pipeline.
//!
//! Preconditions (bad inputs) fail fast *before* any fitting is attempted.
//! Non-convergence and unavailable uncertainties are deliberately **not**
//! errors: the fit result carries them as flags so the caller can inspect the
//! last iterate and decide what to do (see `domain::FitResult`).

/// All failures surfaced by the library.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Input sequences have different lengths.
    LengthMismatch { x: usize, y: usize },
    /// Fitting a five-parameter conic needs at least five points.
    TooFewPoints { needed: usize, got: usize },
    /// An input coordinate, error bar, or setting is NaN/inf.
    NonFiniteInput(String),
    /// Geometrically invalid conic parameters (negative scale, negative
    /// eccentricity, non-finite fields).
    InvalidParams(String),
    /// A run/generation setting that cannot be honored.
    InvalidConfig(String),
    /// The mirror point divides by the eccentricity; a circle has none.
    MirrorUndefined,
    /// File or serialization failure in ingest/export.
    Io { context: String, detail: String },
}

impl FitError {
    /// Process exit code for the CLI: input problems are 2, output problems 4.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::LengthMismatch { .. }
            | FitError::TooFewPoints { .. }
            | FitError::NonFiniteInput(_)
            | FitError::InvalidParams(_)
            | FitError::InvalidConfig(_)
            | FitError::MirrorUndefined => 2,
            FitError::Io { .. } => 4,
        }
    }

    /// Shorthand for I/O failures with a human-readable context.
    pub fn io(context: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        FitError::Io {
            context: context.into(),
            detail: detail.to_string(),
        }
    }
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::LengthMismatch { x, y } => {
                write!(f, "Input length mismatch: {x} x-values vs {y} y-values.")
            }
            FitError::TooFewPoints { needed, got } => {
                write!(f, "Insufficient points: need at least {needed}, got {got}.")
            }
            FitError::NonFiniteInput(what) => write!(f, "Non-finite input: {what}."),
            FitError::InvalidParams(what) => write!(f, "Invalid conic parameters: {what}."),
            FitError::InvalidConfig(what) => write!(f, "Invalid configuration: {what}."),
            FitError::MirrorUndefined => {
                write!(f, "Mirror point is undefined for zero eccentricity (circle).")
            }
            FitError::Io { context, detail } => write!(f, "{context}: {detail}"),
        }
    }
}

impl std::error::Error for FitError {}
