//! Focus–directrix residual model for conic sections.
//!
//! A conic is the locus `r = e·d`: distance to the focus equals eccentricity
//! times distance to the directrix. For a point `(x, y)` and parameters
//! `(x0, y0, r0, θ0, e)`:
//!
//! ```text
//! r    = hypot(x − x0, y − y0)              radius from the focus
//! proj = (x − x0)·cos θ0 + (y − y0)·sin θ0  projection onto the axis
//! e·d  = (1 + e)·r0 − e·proj                scaled directrix distance
//! res  = (r − e·d) / err                    zero on the curve
//! ```
//!
//! We work with the `(1+e)`-rescaled product `e·d` rather than `d` itself:
//! it matches the polar parametrization `r(φ) = r0(1+e)/(1+e·cos φ)` used by
//! the reconstructor for every eccentricity, avoids cancellation for small
//! `e`, and reduces to the circle residual `r − r0` at `e = 0`. An equivalent
//! plain-distance variant (`d = 2r0 − proj`) agrees only at `e = 1`; see
//! DESIGN.md.
//!
//! Everything here is stateless and side-effect-free, so residuals may be
//! evaluated concurrently (e.g. by an ensemble sampler's worker threads).

use crate::domain::ConicParams;
use crate::fit::bounds::ParamSpec;

/// Unweighted residual of a single point.
#[inline]
pub fn residual_at(p: &ConicParams, x: f64, y: f64) -> f64 {
    let (cth, sth) = p.axis_unit();
    let dx = x - p.x0;
    let dy = y - p.y0;
    let r = dx.hypot(dy);
    let proj = dx * cth + dy * sth;
    let ed = (1.0 + p.eccentricity) * p.r0 - p.eccentricity * proj;
    r - ed
}

/// One residual per point, weighted by the measurement errors when supplied.
///
/// # Panics
/// Panics if the slices have different lengths. Callers go through
/// `PointSet`, which enforces this at construction.
pub fn residuals(p: &ConicParams, x: &[f64], y: &[f64], err: Option<&[f64]>) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "residuals: x/y length mismatch");
    if let Some(e) = err {
        assert_eq!(x.len(), e.len(), "residuals: error length mismatch");
    }
    (0..x.len())
        .map(|i| {
            let res = residual_at(p, x[i], y[i]);
            match err {
                Some(e) => res / e[i],
                None => res,
            }
        })
        .collect()
}

/// Partial derivatives of the **unweighted** residual with respect to the
/// canonical parameters `(x0, y0, r0, theta0, eccentricity)`.
///
/// `theta0` is differentiated in degrees (a `π/180` chain factor), matching
/// how the parameter is stored and fitted. A point sitting exactly on the
/// focus has no radial direction; its unit-vector terms are taken as zero.
pub fn jacobian_row(p: &ConicParams, x: f64, y: f64) -> [f64; 5] {
    let (cth, sth) = p.axis_unit();
    let dx = x - p.x0;
    let dy = y - p.y0;
    let r = dx.hypot(dy);
    let (ux, uy) = if r > 0.0 { (dx / r, dy / r) } else { (0.0, 0.0) };
    let proj = dx * cth + dy * sth;
    let e = p.eccentricity;

    [
        -ux - e * cth,
        -uy - e * sth,
        -(1.0 + e),
        e * (-dx * sth + dy * cth) * std::f64::consts::PI / 180.0,
        -p.r0 + proj,
    ]
}

/// Intermediate vectors of the residual computation, for diagnostics.
///
/// `residual` is bitwise-identical to what [`residuals`] returns; collecting
/// the decomposition never changes the fit. `d` is the plain directrix
/// distance `e·d / e` and is `None` for a circle (`e = 0`), which has no
/// directrix.
#[derive(Debug, Clone)]
pub struct ResidualParts {
    /// Radius of each point from the focus.
    pub r: Vec<f64>,
    /// Distance of each point from the directrix (`None` when `e = 0`).
    pub d: Option<Vec<f64>>,
    /// Scaled directrix distance `e·d` actually used by the model.
    pub ed: Vec<f64>,
    /// The weighted residuals.
    pub residual: Vec<f64>,
}

/// Residuals plus their decomposition. Separate entry point so the fast path
/// allocates nothing extra; the debug-bundle writer is the only consumer.
pub fn residual_parts(
    p: &ConicParams,
    x: &[f64],
    y: &[f64],
    err: Option<&[f64]>,
) -> ResidualParts {
    let (cth, sth) = p.axis_unit();
    let e = p.eccentricity;
    let n = x.len();

    let mut r = Vec::with_capacity(n);
    let mut ed = Vec::with_capacity(n);
    let mut residual = Vec::with_capacity(n);
    for i in 0..n {
        let dx = x[i] - p.x0;
        let dy = y[i] - p.y0;
        let ri = dx.hypot(dy);
        let proj = dx * cth + dy * sth;
        let edi = (1.0 + e) * p.r0 - e * proj;
        r.push(ri);
        ed.push(edi);
        let res = ri - edi;
        residual.push(match err {
            Some(eps) => res / eps[i],
            None => res,
        });
    }
    let d = (e > 0.0).then(|| ed.iter().map(|v| v / e).collect());

    ResidualParts { r, d, ed, residual }
}

/// Log-probability adapter for external ensemble samplers.
///
/// Exposes the same residual contract as the fitter in the shape a generic
/// MCMC sampler wants: a function of the free-parameter values returning
/// `−½·χ²`, with `−∞` outside the declared bounds. The adapter borrows its
/// inputs immutably and is `Sync`, so walkers may call it from many threads.
/// No sampler is implemented here; this is the integration point.
#[derive(Debug, Clone)]
pub struct ConicPosterior<'a> {
    x: &'a [f64],
    y: &'a [f64],
    err: Option<&'a [f64]>,
    specs: &'a [ParamSpec],
}

impl<'a> ConicPosterior<'a> {
    pub fn new(
        x: &'a [f64],
        y: &'a [f64],
        err: Option<&'a [f64]>,
        specs: &'a [ParamSpec],
    ) -> Self {
        Self { x, y, err, specs }
    }

    /// Names of the free parameters, in the order `log_prob` expects.
    pub fn free_names(&self) -> Vec<&'static str> {
        self.specs.iter().filter(|s| s.vary).map(|s| s.name).collect()
    }

    /// `−½·χ²` at the given free-parameter values (fixed parameters keep
    /// their declared values); `−∞` outside the bounds.
    pub fn log_prob(&self, free_values: &[f64]) -> f64 {
        let mut values = [0.0; 5];
        let mut k = 0;
        for (i, spec) in self.specs.iter().enumerate() {
            if spec.vary {
                let v = free_values[k];
                k += 1;
                if !spec.bound.contains(v) {
                    return f64::NEG_INFINITY;
                }
                values[i] = v;
            } else {
                values[i] = spec.init;
            }
        }
        let params = ConicParams::from_array(values);
        let chisqr: f64 = residuals(&params, self.x, self.y, self.err)
            .iter()
            .map(|r| r * r)
            .sum();
        -0.5 * chisqr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::XyConic;
    use crate::fit::bounds::Bound;

    fn params(x0: f64, y0: f64, r0: f64, theta0: f64, e: f64) -> ConicParams {
        ConicParams { x0, y0, r0, theta0, eccentricity: e }
    }

    #[test]
    fn residual_is_zero_on_the_modeled_curve() {
        // Points generated by the reconstructor's own parametrization must
        // sit on the model's zero set, for every conic family.
        for p in [
            params(3.0, -1.0, 2.0, 30.0, 0.0),  // circle
            params(3.0, -1.0, 2.0, 30.0, 0.6),  // ellipse
            params(3.0, -1.0, 2.0, 210.0, 1.0), // parabola
            params(3.0, -1.0, 2.0, 30.0, 1.4),  // hyperbola
        ] {
            let curve = XyConic::from_params(&p).unwrap();
            let res = residuals(&p, curve.x_pts(), curve.y_pts(), None);
            for (i, v) in res.iter().enumerate() {
                assert!(
                    v.abs() < 1e-9,
                    "e={}: residual {v} at sample {i}",
                    p.eccentricity
                );
            }
        }
    }

    #[test]
    fn circle_residual_is_radius_minus_scale() {
        let p = params(0.0, 0.0, 2.0, 0.0, 0.0);
        let res = residual_at(&p, 5.0, 0.0);
        assert!((res - 3.0).abs() < 1e-12);
    }

    #[test]
    fn measurement_errors_scale_the_residuals() {
        let p = params(0.0, 0.0, 1.0, 0.0, 1.0);
        let x = [3.0, 4.0];
        let y = [1.0, -2.0];
        let plain = residuals(&p, &x, &y, None);
        let weighted = residuals(&p, &x, &y, Some(&[2.0, 4.0]));
        assert!((weighted[0] - plain[0] / 2.0).abs() < 1e-12);
        assert!((weighted[1] - plain[1] / 4.0).abs() < 1e-12);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let p = params(1.5, -0.5, 2.0, 40.0, 0.8);
        let (x, y) = (4.0, 3.0);
        let analytic = jacobian_row(&p, x, y);

        let h = 1e-6;
        let base = p.to_array();
        for k in 0..5 {
            let mut plus = base;
            let mut minus = base;
            plus[k] += h;
            minus[k] -= h;
            let fd = (residual_at(&ConicParams::from_array(plus), x, y)
                - residual_at(&ConicParams::from_array(minus), x, y))
                / (2.0 * h);
            assert!(
                (analytic[k] - fd).abs() < 1e-6,
                "param {}: analytic {} vs fd {fd}",
                ConicParams::NAMES[k],
                analytic[k]
            );
        }
    }

    #[test]
    fn parts_agree_with_the_fast_path() {
        let p = params(1.0, 2.0, 1.5, 120.0, 1.0);
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [5.0, 4.0, 4.5, 6.0];
        let err = [0.5, 0.5, 1.0, 2.0];

        let fast = residuals(&p, &x, &y, Some(&err));
        let parts = residual_parts(&p, &x, &y, Some(&err));
        assert_eq!(fast, parts.residual);
        // r = e·d on the curve; off the curve the decomposition is r − e·d.
        for i in 0..x.len() {
            assert!((parts.r[i] - parts.ed[i] - fast[i] * err[i]).abs() < 1e-12);
        }
        let d = parts.d.expect("parabola has a directrix");
        for i in 0..x.len() {
            assert!((d[i] - parts.ed[i]).abs() < 1e-12, "e=1: d == e*d");
        }
    }

    #[test]
    fn parts_have_no_directrix_for_a_circle() {
        let p = params(0.0, 0.0, 1.0, 0.0, 0.0);
        let parts = residual_parts(&p, &[1.0, 2.0], &[0.0, 0.0], None);
        assert!(parts.d.is_none());
    }

    #[test]
    fn posterior_is_half_chisq_and_respects_bounds() {
        let x = [3.0, 0.0, -3.0];
        let y = [3.0, 1.0, 3.0];
        let specs = vec![
            ParamSpec::fixed("x0", 0.0),
            ParamSpec::fixed("y0", 0.0),
            ParamSpec::new("r0", 1.0, Bound::Min(0.0)),
            ParamSpec::fixed("theta0", 90.0),
            ParamSpec::fixed("eccentricity", 1.0),
        ];
        let post = ConicPosterior::new(&x, &y, None, &specs);
        assert_eq!(post.free_names(), vec!["r0"]);

        let p = ConicParams { x0: 0.0, y0: 0.0, r0: 1.0, theta0: 90.0, eccentricity: 1.0 };
        let chisqr: f64 = residuals(&p, &x, &y, None).iter().map(|r| r * r).sum();
        assert!((post.log_prob(&[1.0]) + 0.5 * chisqr).abs() < 1e-12);
        assert_eq!(post.log_prob(&[-1.0]), f64::NEG_INFINITY);
    }
}
