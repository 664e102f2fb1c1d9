//! Synthetic arc samples for demos and tests.
//!
//! Two sources:
//!
//! - `demo_points()`: the classic seven-point stretched arc used throughout
//!   the demos: symmetric in origin, then sheared and scaled to make the
//!   fit interesting. Seven points is a comfortable minimum; five is the
//!   hard floor and tends to produce suspiciously small residuals.
//! - `generate_arc()`: points sampled along a known conic with seeded
//!   radial Gaussian noise, for exercising the fitter against ground truth.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::curve::XyConic;
use crate::domain::{ConicParams, PointSet};
use crate::error::FitError;

/// The seven-point demonstration arc.
///
/// Constructed as `x = 3·[1..7]`, `y = [0,4,6,7,6,4,0] + [1..7]`: a symmetric
/// dome sheared upward and stretched in x.
pub fn demo_points() -> PointSet {
    let x = vec![3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0];
    let y = vec![1.0, 6.0, 9.0, 11.0, 11.0, 10.0, 7.0];
    PointSet::new(x, y).expect("demo fixture is well formed")
}

/// Configuration for synthetic arc generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Ground-truth conic the points are drawn from.
    pub params: ConicParams,
    /// Number of points.
    pub count: usize,
    /// Half-width of the sampled polar-angle window around the apex, in
    /// degrees.
    pub half_span_deg: f64,
    /// Standard deviation of the radial Gaussian noise (input units).
    pub noise: f64,
    /// RNG seed; identical seeds reproduce identical points.
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            params: ConicParams { x0: 0.0, y0: 0.0, r0: 2.0, theta0: 90.0, eccentricity: 1.0 },
            count: 25,
            half_span_deg: 70.0,
            noise: 0.02,
            seed: 42,
        }
    }
}

/// Generate noisy points along a known conic arc.
///
/// Points are ordered by polar angle across the window; noise displaces each
/// point radially (toward/away from the focus). A radial bump `b` at angle φ
/// perturbs the model residual by `b·(1 + e·cos φ)`.
pub fn generate_arc(config: &SampleConfig) -> Result<PointSet, FitError> {
    config.params.validate()?;
    if config.count == 0 {
        return Err(FitError::InvalidConfig("sample count must be > 0".to_string()));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(FitError::InvalidConfig("noise must be finite and >= 0".to_string()));
    }
    if !(config.half_span_deg.is_finite() && config.half_span_deg > 0.0) {
        return Err(FitError::InvalidConfig("angular span must be > 0".to_string()));
    }

    // Reuse the reconstruction parametrization; clamp the window inside the
    // open-branch limit for parabolas/hyperbolas.
    let shape = XyConic::with_samples(&config.params, 2)?;
    let limit = crate::curve::phi_limit(config.params.eccentricity);
    let half_span = config.half_span_deg.to_radians().min(0.95 * limit);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| FitError::InvalidConfig(format!("noise distribution: {e}")))?;

    let n = config.count;
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let u = if n == 1 { 0.5 } else { i as f64 / (n - 1) as f64 };
        let phi = half_span * (2.0 * u - 1.0);
        let [px, py] = shape.point_at(phi);

        // Radial displacement off the true curve.
        let dx = px - config.params.x0;
        let dy = py - config.params.y0;
        let r = dx.hypot(dy);
        let (ux, uy) = if r > 0.0 { (dx / r, dy / r) } else { (0.0, 0.0) };
        let bump = config.noise * normal.sample(&mut rng);
        x.push(px + bump * ux);
        y.push(py + bump * uy);
    }

    PointSet::new(x, y)
}
