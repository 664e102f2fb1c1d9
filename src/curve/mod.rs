//! Curve reconstruction: sampled geometry of a fitted conic.
//!
//! The conic is parametrized in polar form about the focus:
//!
//! ```text
//! r(φ) = r0·(1+e) / (1 + e·cos φ)
//! x(φ) = x0 + r(φ)·cos(θ0+φ),  y(φ) = y0 + r(φ)·sin(θ0+φ)
//! ```
//!
//! Sampling policy: an ellipse/circle (`e < 1`) is closed, so φ covers the
//! full (−π, π]. A parabola or hyperbola (`e ≥ 1`) is open; we sample only
//! the physical branch, strictly inside the asymptotic angle where `r(φ)`
//! diverges. This is a display/inspection aid; fitting never consumes it.

use crate::domain::ConicParams;
use crate::error::FitError;

/// Default number of samples along the curve (generous enough for a smooth
/// rendered line).
pub const DEFAULT_SAMPLES: usize = 200;

/// Fraction of the asymptotic angle actually sampled on open branches; at
/// the angle itself the radius diverges.
const BRANCH_MARGIN: f64 = 0.95;

/// Largest polar angle with a finite radius.
///
/// `e < 1`: π (the curve is closed). `e = 1`: π, approached but never
/// reached. `e > 1`: `π − atan(√(e²−1))`, where the hyperbola runs off to
/// infinity along its asymptote.
pub fn phi_limit(eccentricity: f64) -> f64 {
    if eccentricity > 1.0 {
        std::f64::consts::PI - (eccentricity * eccentricity - 1.0).sqrt().atan()
    } else {
        // Covers the parabola explicitly: √(e²−1) has no real value below
        // e = 1, and at e = 1 the limit is exactly π.
        std::f64::consts::PI
    }
}

/// A reconstructed conic: sampled points plus the labeled axis points.
///
/// Built fresh per request from a parameter snapshot; immutable afterwards.
#[derive(Debug, Clone)]
pub struct XyConic {
    params: ConicParams,
    x_pts: Vec<f64>,
    y_pts: Vec<f64>,
    apex: [f64; 2],
    mirror: Option<[f64; 2]>,
}

impl XyConic {
    /// Reconstruct with the default sample count.
    pub fn from_params(params: &ConicParams) -> Result<Self, FitError> {
        Self::with_samples(params, DEFAULT_SAMPLES)
    }

    /// Reconstruct with an explicit sample count (minimum 2).
    pub fn with_samples(params: &ConicParams, samples: usize) -> Result<Self, FitError> {
        params.validate()?;
        let n = samples.max(2);
        let e = params.eccentricity;

        let phis: Vec<f64> = if e < 1.0 {
            // Closed curve: full sweep, endpoint included once.
            let span = 2.0 * std::f64::consts::PI;
            (0..n)
                .map(|i| -std::f64::consts::PI + span * (i + 1) as f64 / n as f64)
                .collect()
        } else {
            let lim = phi_limit(e) * BRANCH_MARGIN;
            (0..n)
                .map(|i| lim * (2.0 * i as f64 / (n - 1) as f64 - 1.0))
                .collect()
        };

        let apex = params.apex();
        // A circle has no directrix direction, hence no mirror point.
        let mirror = (e > 0.0).then(|| {
            params
                .mirror_point()
                .expect("eccentricity checked positive")
        });

        let mut out = Self {
            params: *params,
            x_pts: Vec::with_capacity(n),
            y_pts: Vec::with_capacity(n),
            apex,
            mirror,
        };
        for phi in phis {
            let [px, py] = out.point_at(phi);
            out.x_pts.push(px);
            out.y_pts.push(py);
        }
        Ok(out)
    }

    /// Exact point of the parametrization at polar angle `phi`.
    ///
    /// At `φ = 0` this reproduces the apex bit-for-bit: the radius is
    /// computed as `r0·((1+e)/(1+e·cos φ))`, and the ratio is exactly 1
    /// there.
    pub fn point_at(&self, phi: f64) -> [f64; 2] {
        let p = &self.params;
        let e = p.eccentricity;
        let r = p.r0 * ((1.0 + e) / (1.0 + e * phi.cos()));
        let (cth, sth) = p.axis_unit();
        let (sphi, cphi) = phi.sin_cos();
        // cos(θ0+φ), sin(θ0+φ) via the angle-sum identities; θ0 is converted
        // to radians in exactly one place (`axis_unit`).
        let cos_total = cth * cphi - sth * sphi;
        let sin_total = sth * cphi + cth * sphi;
        [p.x0 + r * cos_total, p.y0 + r * sin_total]
    }

    pub fn params(&self) -> &ConicParams {
        &self.params
    }

    pub fn x_pts(&self) -> &[f64] {
        &self.x_pts
    }

    pub fn y_pts(&self) -> &[f64] {
        &self.y_pts
    }

    pub fn len(&self) -> usize {
        self.x_pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_pts.is_empty()
    }

    /// Vertex of the conic nearest the focus (`φ = 0`).
    pub fn apex(&self) -> [f64; 2] {
        self.apex
    }

    /// Directrix crossing on the symmetry axis; `None` for a circle.
    pub fn mirror(&self) -> Option<[f64; 2]> {
        self.mirror
    }
}
