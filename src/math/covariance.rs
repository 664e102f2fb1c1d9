//! Covariance and correlation from the Jacobian at the solution.
//!
//! The minimizer's curvature estimate is `cov = (JᵀJ)⁻¹` (times the reduced
//! chi-square when the data carry no measurement errors). Conic fits can
//! produce a nearly rank-deficient `JᵀJ` (e.g. an arc short enough that the
//! focus position and scale trade off freely), so:
//!
//! - we invert via SVD and check the condition number first
//! - an ill-conditioned or non-positive result is reported as `None`, never
//!   as a matrix of misleading zeros

use nalgebra::DMatrix;

/// Relative singular-value cutoff below which `JᵀJ` is treated as singular.
const COND_TOL: f64 = 1e-12;

/// Invert `JᵀJ` for a Jacobian evaluated at the solution.
///
/// Returns `None` when the system is too ill-conditioned for the inverse to
/// mean anything (the caller reports uncertainties as unavailable).
pub fn covariance_from_jacobian(jac: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if jac.nrows() == 0 || jac.ncols() == 0 {
        return None;
    }
    let jtj = jac.transpose() * jac;
    if jtj.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let svd = jtj.svd(true, true);
    let smax = svd.singular_values.max();
    let smin = svd.singular_values.min();
    if !smax.is_finite() || smax <= 0.0 || smin / smax < COND_TOL {
        return None;
    }

    let cov = svd.pseudo_inverse(smax * COND_TOL).ok()?;
    if cov.iter().any(|v| !v.is_finite()) {
        return None;
    }
    // Variances must be positive for standard errors to exist.
    if (0..cov.nrows()).any(|i| cov[(i, i)] <= 0.0) {
        return None;
    }
    Some(cov)
}

/// Turn a covariance matrix into a correlation matrix (unit diagonal).
pub fn correlation_from_covariance(cov: &DMatrix<f64>) -> DMatrix<f64> {
    let n = cov.nrows();
    let mut correl = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let denom = (cov[(i, i)] * cov[(j, j)]).sqrt();
            correl[(i, j)] = if denom > 0.0 { cov[(i, j)] / denom } else { 0.0 };
        }
    }
    correl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_a_well_conditioned_system() {
        // J = I (2x2) => JtJ = I => cov = I.
        let jac = DMatrix::<f64>::identity(4, 2);
        let cov = covariance_from_jacobian(&jac).unwrap();
        assert!((cov[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((cov[(1, 1)] - 1.0).abs() < 1e-12);
        assert!(cov[(0, 1)].abs() < 1e-12);
    }

    #[test]
    fn singular_jacobian_yields_none() {
        // Two identical columns: rank 1.
        let jac = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        assert!(covariance_from_jacobian(&jac).is_none());
    }

    #[test]
    fn correlation_has_unit_diagonal() {
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 9.0]);
        let correl = correlation_from_covariance(&cov);
        assert!((correl[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((correl[(1, 1)] - 1.0).abs() < 1e-12);
        assert!((correl[(0, 1)] - 1.0 / 6.0).abs() < 1e-12);
    }
}
