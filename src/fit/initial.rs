//! Initial parameter guess from raw point data.
//!
//! The heuristic assumes the points trace an arc that brackets a vertex:
//!
//! 1. focus guess = per-coordinate median (robust center)
//! 2. scale guess = mean radius of the 5 points closest to that center
//! 3. orientation guess = circular mean of those same points' bearings
//! 4. eccentricity seed = 1 (parabola), the neutral middle of the family
//!
//! It is a best-effort seed, not a guaranteed-good local-optimum avoider;
//! pathological arrangements still land the minimizer in a local minimum.

use crate::domain::ConicParams;
use crate::error::FitError;
use crate::math::{circular_mean, median, normalize_degrees, smallest_k_indices};

/// Minimum point count: five parameters need at least five observations.
pub const MIN_POINTS: usize = 5;

/// Number of closest-to-center points feeding the scale/orientation guess.
const CLOSEST_COUNT: usize = 5;

/// Derive an initial `ConicParams` from discrete `(x, y)` data points.
pub fn init_conic_from_xy(x: &[f64], y: &[f64]) -> Result<ConicParams, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch { x: x.len(), y: y.len() });
    }
    if x.len() < MIN_POINTS {
        return Err(FitError::TooFewPoints { needed: MIN_POINTS, got: x.len() });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::NonFiniteInput("point coordinates".to_string()));
    }

    // Focus starts at the median position of the data.
    let x0 = median(x).expect("non-empty by the checks above");
    let y0 = median(y).expect("non-empty by the checks above");

    // Radius and bearing of every point about the trial focus.
    let radii: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - x0).hypot(yi - y0))
        .collect();
    let bearings: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (yi - y0).atan2(xi - x0))
        .collect();

    // The closest points straddle the vertex region; average them.
    let closest = smallest_k_indices(&radii, CLOSEST_COUNT);
    let r0 = closest.iter().map(|&i| radii[i]).sum::<f64>() / closest.len() as f64;

    let closest_bearings: Vec<f64> = closest.iter().map(|&i| bearings[i]).collect();
    // A zero resultant means the closest points point every which way; any
    // orientation is then as good as another, so fall back to 0°.
    let theta0 = circular_mean(&closest_bearings)
        .map(|rad| normalize_degrees(rad.to_degrees()))
        .unwrap_or(0.0);

    Ok(ConicParams { x0, y0, r0, theta0, eccentricity: 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo_points;

    #[test]
    fn too_few_points_fail_fast() {
        let err = init_conic_from_xy(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(err, FitError::TooFewPoints { needed: 5, got: 4 });
    }

    #[test]
    fn mismatched_lengths_fail_fast() {
        let err = init_conic_from_xy(&[1.0; 6], &[1.0; 5]).unwrap_err();
        assert_eq!(err, FitError::LengthMismatch { x: 6, y: 5 });
    }

    #[test]
    fn center_is_the_median_position() {
        let x = [0.0, 1.0, 2.0, 3.0, 100.0];
        let y = [10.0, 11.0, 12.0, 13.0, -50.0];
        let init = init_conic_from_xy(&x, &y).unwrap();
        // Medians shrug off the outlier.
        assert_eq!(init.x0, 2.0);
        assert_eq!(init.y0, 12.0);
        assert_eq!(init.eccentricity, 1.0);
    }

    #[test]
    fn orientation_is_always_in_range() {
        let demo = demo_points();
        let init = init_conic_from_xy(demo.x(), demo.y()).unwrap();
        assert!((0.0..360.0).contains(&init.theta0), "theta0 = {}", init.theta0);
        assert!(init.r0 > 0.0);
    }

    #[test]
    fn orientation_survives_the_wraparound_seam() {
        // Five closest points lie due west of the median center: bearings
        // hug ±180° and would average to ~0° with a naive mean.
        let x = [-10.0, -10.1, -9.9, -10.05, -9.95, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 40.0, 40.0];
        let y = [0.3, -0.2, 0.25, -0.15, 0.1, 30.0, -30.0, 31.0, -31.0, 32.0, -32.0, 33.0, 5.0, -5.0];
        let init = init_conic_from_xy(&x, &y).unwrap();
        assert!(
            (init.theta0 - 180.0).abs() < 5.0,
            "expected a westward orientation, got {}",
            init.theta0
        );
    }

    #[test]
    fn scale_is_the_mean_of_the_closest_radii() {
        // Center is (0, 0) by medians; radii are 1, 1, 2, 2, 5, 5, 0.
        let x = [0.0, 1.0, -1.0, 2.0, -2.0, 5.0, -5.0];
        let y = [0.0; 7];
        let init = init_conic_from_xy(&x, &y).unwrap();
        // Closest five radii: 0, 1, 1, 2, 2.
        assert!((init.r0 - 1.2).abs() < 1e-12, "r0 = {}", init.r0);
    }
}
