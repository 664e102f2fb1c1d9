//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can
//! be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Parameters of a conic section in focus–directrix form.
///
/// The curve is the locus of points whose distance to the focus `(x0, y0)`
/// equals `eccentricity` times their distance to the directrix. `r0` is the
/// focus→apex distance and `theta0` points from the focus toward the apex.
///
/// `theta0` is stored in **degrees**; [`ConicParams::axis_unit`] is the single
/// place where it is converted to radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConicParams {
    /// Focus x (input units).
    pub x0: f64,
    /// Focus y (input units).
    pub y0: f64,
    /// Focus→apex distance; must be ≥ 0.
    pub r0: f64,
    /// Axis orientation in degrees, conventionally in [0, 360).
    pub theta0: f64,
    /// 0 = circle, (0,1) = ellipse, 1 = parabola, >1 = hyperbola; must be ≥ 0.
    pub eccentricity: f64,
}

impl ConicParams {
    /// Canonical parameter order used by the fitter and all reports.
    pub const NAMES: [&'static str; 5] = ["x0", "y0", "r0", "theta0", "eccentricity"];

    pub fn to_array(self) -> [f64; 5] {
        [self.x0, self.y0, self.r0, self.theta0, self.eccentricity]
    }

    pub fn from_array(a: [f64; 5]) -> Self {
        Self {
            x0: a[0],
            y0: a[1],
            r0: a[2],
            theta0: a[3],
            eccentricity: a[4],
        }
    }

    /// Unit vector along the symmetry axis (focus → apex).
    ///
    /// This is the only degrees→radians conversion point; the model, the
    /// Jacobian and the reconstructor all go through it.
    pub fn axis_unit(&self) -> (f64, f64) {
        let t = self.theta0.to_radians();
        (t.cos(), t.sin())
    }

    /// Apex of the conic: the vertex nearest the focus, at distance `r0`
    /// along the axis.
    pub fn apex(&self) -> [f64; 2] {
        let (cth, sth) = self.axis_unit();
        [self.x0 + self.r0 * cth, self.y0 + self.r0 * sth]
    }

    /// Mirror point: where the directrix crosses the symmetry axis, at
    /// `r0/eccentricity` beyond the apex. A circle has no directrix, so
    /// `eccentricity = 0` is rejected rather than producing NaN.
    pub fn mirror_point(&self) -> Result<[f64; 2], FitError> {
        if self.eccentricity <= 0.0 {
            return Err(FitError::MirrorUndefined);
        }
        let (cth, sth) = self.axis_unit();
        let reach = self.r0 + self.r0 / self.eccentricity;
        Ok([self.x0 + reach * cth, self.y0 + reach * sth])
    }

    /// Check geometric validity: finite fields, non-negative scale and
    /// eccentricity.
    pub fn validate(&self) -> Result<(), FitError> {
        let a = self.to_array();
        if a.iter().any(|v| !v.is_finite()) {
            return Err(FitError::InvalidParams("non-finite field".to_string()));
        }
        if self.r0 < 0.0 {
            return Err(FitError::InvalidParams(format!("r0 = {} < 0", self.r0)));
        }
        if self.eccentricity < 0.0 {
            return Err(FitError::InvalidParams(format!(
                "eccentricity = {} < 0",
                self.eccentricity
            )));
        }
        Ok(())
    }
}

/// A validated set of input points (plus optional per-point errors).
///
/// Construction enforces equal lengths and finite values, so the fitting code
/// can index freely. Five points are required to constrain the five conic
/// parameters; that minimum is enforced by the initializer/fitter, not here,
/// so a `PointSet` can also carry reconstruction-only data.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    x: Vec<f64>,
    y: Vec<f64>,
    err: Option<Vec<f64>>,
}

impl PointSet {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, FitError> {
        Self::build(x, y, None)
    }

    /// Points with per-point measurement errors (same length, all > 0).
    pub fn with_errors(x: Vec<f64>, y: Vec<f64>, err: Vec<f64>) -> Result<Self, FitError> {
        Self::build(x, y, Some(err))
    }

    fn build(x: Vec<f64>, y: Vec<f64>, err: Option<Vec<f64>>) -> Result<Self, FitError> {
        if x.len() != y.len() {
            return Err(FitError::LengthMismatch { x: x.len(), y: y.len() });
        }
        if let Some(e) = &err {
            if e.len() != x.len() {
                return Err(FitError::LengthMismatch { x: x.len(), y: e.len() });
            }
            if e.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(FitError::NonFiniteInput(
                    "measurement errors must be finite and > 0".to_string(),
                ));
            }
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteInput("point coordinates".to_string()));
        }
        Ok(Self { x, y, err })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn err(&self) -> Option<&[f64]> {
        self.err.as_deref()
    }

    /// Observed (min, max) of the x coordinates. `None` when empty.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        Self::range(&self.x)
    }

    /// Observed (min, max) of the y coordinates. `None` when empty.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        Self::range(&self.y)
    }

    fn range(values: &[f64]) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in values {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Some((lo, hi))
    }
}

/// Goodness-of-fit statistics.
///
/// `aic`/`bic` use the least-squares log-likelihood form
/// `n·ln(χ²/n) + penalty`, which is comparable across fits of the same data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    /// Sum of squared (weighted) residuals.
    pub chisqr: f64,
    /// `chisqr / nfree`.
    pub redchi: f64,
    /// Number of data points.
    pub ndata: usize,
    /// Number of varying parameters.
    pub nvarys: usize,
    /// Degrees of freedom: `ndata - nvarys`.
    pub nfree: usize,
    pub aic: f64,
    pub bic: f64,
}

/// Per-parameter uncertainty data derived from the minimizer's Hessian
/// approximation at the solution.
///
/// Only a local curvature estimate; without real measurement errors the
/// absolute scale comes from the reduced chi-square and should be read with
/// care (posterior sampling gives better answers; see `models::conic`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitStats {
    /// Standard error per canonical parameter; `None` for fixed parameters.
    pub stderr: Vec<Option<f64>>,
    /// Names of the varying parameters, in the order used by `correl`.
    pub free_names: Vec<String>,
    /// Correlation matrix over the varying parameters (row-major).
    pub correl: Vec<Vec<f64>>,
}

/// Result of one conic fit.
///
/// A failed convergence is **not** an error: `converged` is false and the
/// fields hold the minimizer's last iterate. Uncertainties are `None` when the
/// Hessian was singular or ill-conditioned, never silently zeroed.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub params: ConicParams,
    /// Bound/fixed state of each canonical parameter during this fit.
    pub specs: Vec<crate::fit::bounds::ParamSpec>,
    /// Per-point residuals at the final parameters.
    pub residuals: Vec<f64>,
    pub quality: FitQuality,
    pub converged: bool,
    /// Minimizer termination reason, rendered for reports.
    pub termination: String,
    /// Residual evaluations consumed by the minimizer.
    pub n_eval: usize,
    pub stats: Option<FitStats>,
}

/// Which fit variant(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    /// Hold eccentricity fixed at 1.
    Parabola,
    /// Let eccentricity vary freely (≥ 0).
    Conic,
    /// Fit both and report them side by side.
    Both,
}

impl ModelChoice {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelChoice::Parabola => "parabola (e = 1)",
            ModelChoice::Conic => "general conic",
            ModelChoice::Both => "parabola + general conic",
        }
    }
}

// clap renders default values through Display; keep it in sync with the
// ValueEnum names so the default round-trips through the parser.
impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelChoice::Parabola => "parabola",
            ModelChoice::Conic => "conic",
            ModelChoice::Both => "both",
        };
        write!(f, "{name}")
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model: ModelChoice,
    /// Bound the focus to within one data-range-width of the observed points.
    pub restrict_xy: bool,
    /// Bound the orientation to ±45° of its initial estimate.
    pub restrict_theta: bool,
    /// Samples along the reconstructed curve.
    pub curve_samples: usize,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    /// Write a markdown bundle with the residual decomposition tables.
    pub debug_bundle: bool,
}

/// A saved curve file (JSON): the portable representation of a fitted conic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    /// RFC 3339 timestamp of the export.
    pub generated: String,
    pub model: String,
    pub params: ConicParams,
    pub quality: FitQuality,
    pub converged: bool,
    pub termination: String,
    /// Whether Hessian-derived uncertainties were available.
    pub has_stats: bool,
    pub grid: CurveGrid,
    pub apex: [f64; 2],
    pub mirror: Option<[f64; 2]>,
}

/// Sampled points along a reconstructed conic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x_pts: Vec<f64>,
    pub y_pts: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_set_rejects_mismatched_lengths() {
        let err = PointSet::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert_eq!(err, FitError::LengthMismatch { x: 2, y: 1 });
    }

    #[test]
    fn point_set_rejects_non_finite_coordinates() {
        let err = PointSet::new(vec![1.0, f64::NAN], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, FitError::NonFiniteInput(_)));
    }

    #[test]
    fn point_set_rejects_non_positive_errors() {
        let err =
            PointSet::with_errors(vec![1.0, 2.0], vec![1.0, 2.0], vec![0.5, 0.0]).unwrap_err();
        assert!(matches!(err, FitError::NonFiniteInput(_)));
    }

    #[test]
    fn apex_lies_r0_along_the_axis() {
        let p = ConicParams {
            x0: 1.0,
            y0: 2.0,
            r0: 3.0,
            theta0: 90.0,
            eccentricity: 1.0,
        };
        let apex = p.apex();
        assert!((apex[0] - 1.0).abs() < 1e-12);
        assert!((apex[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn mirror_point_for_parabola_is_two_r0_past_the_focus() {
        let p = ConicParams {
            x0: 0.0,
            y0: 0.0,
            r0: 2.0,
            theta0: 0.0,
            eccentricity: 1.0,
        };
        let mirror = p.mirror_point().unwrap();
        assert!((mirror[0] - 4.0).abs() < 1e-12);
        assert!(mirror[1].abs() < 1e-12);
    }

    #[test]
    fn mirror_point_rejects_circles() {
        let p = ConicParams {
            x0: 0.0,
            y0: 0.0,
            r0: 2.0,
            theta0: 0.0,
            eccentricity: 0.0,
        };
        assert_eq!(p.mirror_point().unwrap_err(), FitError::MirrorUndefined);
    }

    #[test]
    fn validate_rejects_negative_scale() {
        let p = ConicParams {
            x0: 0.0,
            y0: 0.0,
            r0: -1.0,
            theta0: 0.0,
            eccentricity: 1.0,
        };
        assert!(matches!(p.validate(), Err(FitError::InvalidParams(_))));
    }
}
