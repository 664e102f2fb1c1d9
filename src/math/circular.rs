//! Circular (directional) statistics.
//!
//! Naive averaging of angles breaks at the ±180° wraparound: the mean of
//! {+179°, −179°} should be ±180°, not 0°. We average on the unit circle
//! instead and read the angle back off the summed vector.

/// Circular mean of angles given in **radians**.
///
/// Returns a value in (−π, π]. An empty input or a zero resultant vector
/// (angles perfectly cancelling) yields `None`; there is no meaningful mean
/// direction in either case.
pub fn circular_mean(angles: &[f64]) -> Option<f64> {
    if angles.is_empty() {
        return None;
    }
    let (mut sum_sin, mut sum_cos) = (0.0_f64, 0.0_f64);
    for &a in angles {
        sum_sin += a.sin();
        sum_cos += a.cos();
    }
    let norm = sum_sin.hypot(sum_cos);
    if norm < 1e-12 * angles.len() as f64 {
        return None;
    }
    Some(sum_sin.atan2(sum_cos))
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
