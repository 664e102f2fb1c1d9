//! Nonlinear least-squares fit of a conic to point data.
//!
//! Given points `(x_i, y_i)` (optionally with errors) we minimize the sum of
//! squared focus–directrix residuals over `(x0, y0, r0, theta0[, e])` with a
//! Levenberg–Marquardt driver. Box constraints are folded into unconstrained
//! internal coordinates by `fit::bounds`, so the minimizer itself stays a
//! black box.
//!
//! Failure semantics:
//! - bad inputs fail fast with a `FitError` before any iteration
//! - non-convergence is **flagged** on the returned result (last iterate kept)
//! - an ill-conditioned Hessian leaves `stats = None` rather than inventing
//!   uncertainties

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::domain::{ConicParams, FitQuality, FitResult, FitStats, PointSet};
use crate::error::FitError;
use crate::fit::bounds::{Bound, ParamSpec};
use crate::fit::initial::{MIN_POINTS, init_conic_from_xy};
use crate::math::{correlation_from_covariance, covariance_from_jacobian, normalize_degrees};
use crate::models::conic;

/// Fitting options that affect how the conic is constrained.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Hold the eccentricity fixed at its initial value (1.0 from the
    /// initializer), fitting a parabola. This is the default: a parabola is
    /// usually all a short arc can support.
    pub only_parabola: bool,

    /// Bound the focus to within one data-range-width beyond the observed
    /// min/max of each coordinate. Prevents runaway focus positions on
    /// shallow arcs.
    pub restrict_xy: bool,

    /// Bound the orientation to ±45° of its initial estimate.
    pub restrict_theta: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { only_parabola: true, restrict_xy: false, restrict_theta: false }
    }
}

/// Fit a conic to a point set, deriving the initial guess from the data.
pub fn fit_conic_to_xy(points: &PointSet, opts: &FitOptions) -> Result<FitResult, FitError> {
    let init = init_conic_from_xy(points.x(), points.y())?;
    fit_conic_with_init(points, init, opts)
}

/// Convenience wrapper over plain slices (builds a validated `PointSet`).
pub fn fit_conic_to_slices(
    x: &[f64],
    y: &[f64],
    err: Option<&[f64]>,
    opts: &FitOptions,
) -> Result<FitResult, FitError> {
    let points = match err {
        Some(e) => PointSet::with_errors(x.to_vec(), y.to_vec(), e.to_vec())?,
        None => PointSet::new(x.to_vec(), y.to_vec())?,
    };
    fit_conic_to_xy(&points, opts)
}

/// Fit starting from explicit initial parameters (e.g. to refine a previous
/// result or to probe a different basin).
pub fn fit_conic_with_init(
    points: &PointSet,
    mut init: ConicParams,
    opts: &FitOptions,
) -> Result<FitResult, FitError> {
    if points.len() < MIN_POINTS {
        return Err(FitError::TooFewPoints { needed: MIN_POINTS, got: points.len() });
    }
    init.validate()?;
    // The orientation bound lives on [0, 360); bring caller-supplied angles
    // into that window instead of clamping them against it.
    init.theta0 = normalize_degrees(init.theta0);

    let specs = build_specs(points, &init, opts);
    let free: Vec<usize> = (0..specs.len()).filter(|&i| specs[i].vary).collect();
    let internal = DVector::from_iterator(
        free.len(),
        free.iter().map(|&i| specs[i].bound.to_internal(specs[i].init)),
    );

    let problem = ConicProblem {
        x: points.x(),
        y: points.y(),
        err: points.err(),
        specs: &specs,
        free: &free,
        internal,
    };
    let (problem, report) = LevenbergMarquardt::new().minimize(problem);

    let mut params = problem.external_params();
    // The sine transform can land exactly on 360°; keep the convention.
    params.theta0 = normalize_degrees(params.theta0);

    let residuals = conic::residuals(&params, points.x(), points.y(), points.err());
    let quality = quality_from_residuals(&residuals, free.len());
    let stats = hessian_stats(&params, points, &specs, &free, &quality);

    Ok(FitResult {
        params,
        specs,
        residuals,
        quality,
        converged: report.termination.was_successful(),
        termination: format!("{:?}", report.termination),
        n_eval: report.number_of_evaluations,
        stats,
    })
}

/// Constraints for one fit, in canonical parameter order.
fn build_specs(points: &PointSet, init: &ConicParams, opts: &FitOptions) -> Vec<ParamSpec> {
    let (focus_x, focus_y) = if opts.restrict_xy {
        let (x_lo, x_hi) = points.x_range().expect("validated non-empty");
        let (y_lo, y_hi) = points.y_range().expect("validated non-empty");
        // One data-range-width beyond the observed extent on each side. A
        // degenerate (zero-width) range keeps a sliver so the transform
        // stays well defined.
        let wx = (x_hi - x_lo).max(1e-12);
        let wy = (y_hi - y_lo).max(1e-12);
        (
            Bound::Interval(x_lo - wx, x_hi + wx),
            Bound::Interval(y_lo - wy, y_hi + wy),
        )
    } else {
        (Bound::Free, Bound::Free)
    };

    let mut theta = Bound::Interval(0.0, 360.0);
    if opts.restrict_theta {
        // Truncated at the [0, 360] seam rather than wrapped; a box
        // constraint cannot represent a wrapping window.
        theta = theta.intersect(Bound::Interval(init.theta0 - 45.0, init.theta0 + 45.0));
    }

    let eccentricity = if opts.only_parabola {
        ParamSpec::fixed("eccentricity", init.eccentricity)
    } else {
        ParamSpec::new("eccentricity", init.eccentricity, Bound::Min(0.0))
    };

    vec![
        ParamSpec::new("x0", init.x0, focus_x),
        ParamSpec::new("y0", init.y0, focus_y),
        ParamSpec::new("r0", init.r0, Bound::Min(0.0)),
        ParamSpec::new("theta0", init.theta0, theta),
        eccentricity,
    ]
}

fn quality_from_residuals(residuals: &[f64], nvarys: usize) -> FitQuality {
    let ndata = residuals.len();
    let chisqr: f64 = residuals.iter().map(|r| r * r).sum();
    let nfree = ndata.saturating_sub(nvarys);
    let redchi = chisqr / nfree.max(1) as f64;

    // Least-squares log-likelihood form; floored so a perfect fit doesn't
    // produce -inf.
    let n = ndata as f64;
    let neg2_log_likelihood = n * (chisqr.max(1e-250) / n).ln();
    let aic = neg2_log_likelihood + 2.0 * nvarys as f64;
    let bic = neg2_log_likelihood + n.ln() * nvarys as f64;

    FitQuality { chisqr, redchi, ndata, nvarys, nfree, aic, bic }
}

/// Standard errors and correlations from the curvature at the solution.
///
/// The Jacobian is evaluated in external (physical) coordinates over the
/// varying parameters; without measurement errors the covariance is scaled by
/// the reduced chi-square, as is conventional for unweighted fits.
fn hessian_stats(
    params: &ConicParams,
    points: &PointSet,
    specs: &[ParamSpec],
    free: &[usize],
    quality: &FitQuality,
) -> Option<FitStats> {
    let ndata = points.len();
    let mut jac = DMatrix::zeros(ndata, free.len());
    for row in 0..ndata {
        let drow = conic::jacobian_row(params, points.x()[row], points.y()[row]);
        let w = points.err().map(|e| e[row]).unwrap_or(1.0);
        for (k, &i) in free.iter().enumerate() {
            jac[(row, k)] = drow[i] / w;
        }
    }

    let mut cov = covariance_from_jacobian(&jac)?;
    if points.err().is_none() {
        cov *= quality.redchi;
    }

    let correl_mat = correlation_from_covariance(&cov);
    let mut stderr = vec![None; specs.len()];
    for (k, &i) in free.iter().enumerate() {
        stderr[i] = Some(cov[(k, k)].sqrt());
    }
    let free_names: Vec<String> = free.iter().map(|&i| specs[i].name.to_string()).collect();
    let correl: Vec<Vec<f64>> = (0..free.len())
        .map(|r| (0..free.len()).map(|c| correl_mat[(r, c)]).collect())
        .collect();

    Some(FitStats { stderr, free_names, correl })
}

/// The minimizer-facing problem: free parameters in unbounded internal
/// coordinates, residuals/Jacobian chain-ruled through the bound transforms.
struct ConicProblem<'a> {
    x: &'a [f64],
    y: &'a [f64],
    err: Option<&'a [f64]>,
    specs: &'a [ParamSpec],
    free: &'a [usize],
    internal: DVector<f64>,
}

impl ConicProblem<'_> {
    fn external_params(&self) -> ConicParams {
        let mut values = [0.0; 5];
        for (i, spec) in self.specs.iter().enumerate() {
            values[i] = spec.init;
        }
        for (k, &i) in self.free.iter().enumerate() {
            values[i] = self.specs[i].bound.to_external(self.internal[k]);
        }
        ConicParams::from_array(values)
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for ConicProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, p: &DVector<f64>) {
        self.internal.copy_from(p);
    }

    fn params(&self) -> DVector<f64> {
        self.internal.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let params = self.external_params();
        Some(DVector::from_vec(conic::residuals(&params, self.x, self.y, self.err)))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let params = self.external_params();
        let grads: Vec<f64> = self
            .free
            .iter()
            .enumerate()
            .map(|(k, &i)| self.specs[i].bound.external_grad(self.internal[k]))
            .collect();

        let n = self.x.len();
        let mut jac = DMatrix::zeros(n, self.free.len());
        for row in 0..n {
            let drow = conic::jacobian_row(&params, self.x[row], self.y[row]);
            let w = self.err.map(|e| e[row]).unwrap_or(1.0);
            for (k, &i) in self.free.iter().enumerate() {
                jac[(row, k)] = drow[i] / w * grads[k];
            }
        }
        Some(jac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::XyConic;
    use crate::data::demo_points;

    #[test]
    fn too_few_points_fail_before_fitting() {
        let points = PointSet::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        let err = fit_conic_to_xy(&points, &FitOptions::default()).unwrap_err();
        assert_eq!(err, FitError::TooFewPoints { needed: 5, got: 3 });
    }

    #[test]
    fn parabola_fit_of_the_demo_arc_converges() {
        let points = demo_points();
        let fit = fit_conic_to_xy(&points, &FitOptions::default()).unwrap();

        assert!(fit.converged, "termination: {}", fit.termination);
        // Eccentricity was held fixed at the initializer's seed.
        assert_eq!(fit.params.eccentricity, 1.0);
        assert!(fit.params.r0 > 0.0);
        assert_eq!(fit.residuals.len(), 7);
        assert_eq!(fit.quality.ndata, 7);
        assert_eq!(fit.quality.nvarys, 4);
        assert_eq!(fit.quality.nfree, 3);

        let stats = fit.stats.expect("well-conditioned arc fit has uncertainties");
        // Fixed parameters carry no standard error.
        assert!(stats.stderr[4].is_none());
        assert!(stats.stderr[2].expect("r0 varies").is_finite());
        assert_eq!(stats.free_names.len(), 4);
    }

    #[test]
    fn general_conic_fits_the_demo_arc_at_least_as_well() {
        let points = demo_points();
        let parabola = fit_conic_to_xy(&points, &FitOptions::default()).unwrap();
        let conic = fit_conic_to_xy(
            &points,
            &FitOptions { only_parabola: false, ..FitOptions::default() },
        )
        .unwrap();

        // The demo arc closes in on itself: the free fit lands on an ellipse.
        let e = conic.params.eccentricity;
        assert!(e > 0.0 && e < 1.0, "eccentricity = {e}");
        // One more degree of freedom can only help the raw chi-square.
        assert!(conic.quality.chisqr <= parabola.quality.chisqr + 1e-6);
    }

    #[test]
    fn restricted_focus_stays_within_the_data_window() {
        let points = demo_points();
        let fit = fit_conic_to_xy(
            &points,
            &FitOptions { restrict_xy: true, ..FitOptions::default() },
        )
        .unwrap();

        let (x_lo, x_hi) = points.x_range().unwrap();
        let (y_lo, y_hi) = points.y_range().unwrap();
        let (wx, wy) = (x_hi - x_lo, y_hi - y_lo);
        assert!(fit.params.x0 >= x_lo - wx && fit.params.x0 <= x_hi + wx);
        assert!(fit.params.y0 >= y_lo - wy && fit.params.y0 <= y_hi + wy);
    }

    #[test]
    fn restricted_theta_stays_within_the_window() {
        let points = demo_points();
        let init = init_conic_from_xy(points.x(), points.y()).unwrap();
        let fit = fit_conic_to_xy(
            &points,
            &FitOptions { restrict_theta: true, ..FitOptions::default() },
        )
        .unwrap();
        assert!((fit.params.theta0 - init.theta0).abs() <= 45.0 + 1e-9);
    }

    #[test]
    fn fitting_twice_is_deterministic() {
        let points = demo_points();
        let opts = FitOptions { only_parabola: false, ..FitOptions::default() };
        let a = fit_conic_to_xy(&points, &opts).unwrap();
        let b = fit_conic_to_xy(&points, &opts).unwrap();
        assert_eq!(a.params, b.params);
        assert_eq!(a.residuals, b.residuals);
    }

    #[test]
    fn warm_started_fit_recovers_known_parameters() {
        // Noiseless points sampled from a known parabola; a nearby start must
        // settle onto the generating parameters with ~zero residual.
        let truth = ConicParams { x0: 1.0, y0: -2.0, r0: 2.5, theta0: 70.0, eccentricity: 1.0 };
        let curve = XyConic::with_samples(&truth, 40).unwrap();
        // Use the central part of the branch (around the apex).
        let x: Vec<f64> = curve.x_pts()[10..30].to_vec();
        let y: Vec<f64> = curve.y_pts()[10..30].to_vec();
        let points = PointSet::new(x, y).unwrap();

        let init = ConicParams { x0: 1.3, y0: -1.6, r0: 2.0, theta0: 64.0, eccentricity: 1.0 };
        let fit = fit_conic_with_init(&points, init, &FitOptions::default()).unwrap();

        assert!(fit.converged, "termination: {}", fit.termination);
        assert!(fit.quality.chisqr < 1e-10, "chisqr = {}", fit.quality.chisqr);
        assert!((fit.params.x0 - truth.x0).abs() < 1e-4);
        assert!((fit.params.y0 - truth.y0).abs() < 1e-4);
        assert!((fit.params.r0 - truth.r0).abs() < 1e-4);
        assert!((fit.params.theta0 - truth.theta0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_data_yields_no_uncertainties() {
        // Five copies of one point: the curvature matrix is rank deficient,
        // so uncertainties must be reported as unavailable, not zero.
        let points = PointSet::new(vec![2.0; 5], vec![3.0; 5]).unwrap();
        let fit = fit_conic_to_xy(&points, &FitOptions::default()).unwrap();
        assert!(fit.stats.is_none());
    }
}
