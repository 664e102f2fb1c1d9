//! Shared "fit pipeline" logic used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! points -> initial guess -> fit variant(s) -> curve reconstruction
//!
//! The CLI then focuses on presentation (printing and exports).

use crate::curve::XyConic;
use crate::domain::{FitConfig, FitResult, ModelChoice, PointSet};
use crate::error::FitError;
use crate::fit::{FitOptions, fit_conic_to_xy};

/// One fitted variant plus its reconstructed geometry.
#[derive(Debug, Clone)]
pub struct FitVariant {
    pub label: &'static str,
    pub fit: FitResult,
    pub curve: XyConic,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub parabola: Option<FitVariant>,
    pub conic: Option<FitVariant>,
}

impl RunOutput {
    /// The variant exports should prefer: lower reduced chi-square wins when
    /// both were fitted.
    pub fn preferred(&self) -> &FitVariant {
        match (&self.parabola, &self.conic) {
            (Some(p), Some(c)) => {
                if c.fit.quality.redchi < p.fit.quality.redchi { c } else { p }
            }
            (Some(p), None) => p,
            (None, Some(c)) => c,
            (None, None) => unreachable!("run_fit always produces at least one variant"),
        }
    }

    /// Variants in report order.
    pub fn variants(&self) -> Vec<&FitVariant> {
        self.parabola.iter().chain(self.conic.iter()).collect()
    }
}

/// Execute the fitting pipeline and return the computed outputs.
///
/// With `ModelChoice::Both` the two variants run on rayon workers: the
/// residual model is stateless, so concurrent evaluation is safe by
/// construction.
pub fn run_fit(points: &PointSet, config: &FitConfig) -> Result<RunOutput, FitError> {
    let parabola_opts = FitOptions {
        only_parabola: true,
        restrict_xy: config.restrict_xy,
        restrict_theta: config.restrict_theta,
    };
    let conic_opts = FitOptions { only_parabola: false, ..parabola_opts.clone() };
    let samples = config.curve_samples;

    match config.model {
        ModelChoice::Parabola => Ok(RunOutput {
            parabola: Some(fit_variant(points, &parabola_opts, "parabola", samples)?),
            conic: None,
        }),
        ModelChoice::Conic => Ok(RunOutput {
            parabola: None,
            conic: Some(fit_variant(points, &conic_opts, "conic", samples)?),
        }),
        ModelChoice::Both => {
            let (parabola, conic) = rayon::join(
                || fit_variant(points, &parabola_opts, "parabola", samples),
                || fit_variant(points, &conic_opts, "conic", samples),
            );
            Ok(RunOutput { parabola: Some(parabola?), conic: Some(conic?) })
        }
    }
}

fn fit_variant(
    points: &PointSet,
    opts: &FitOptions,
    label: &'static str,
    samples: usize,
) -> Result<FitVariant, FitError> {
    let fit = fit_conic_to_xy(points, opts)?;
    let curve = XyConic::with_samples(&fit.params, samples)?;
    Ok(FitVariant { label, fit, curve })
}
