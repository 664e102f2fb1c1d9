//! Parameter bounds and the bounded↔free coordinate transforms.
//!
//! The Levenberg–Marquardt driver is unconstrained, so box constraints are
//! expressed by reparametrizing each bounded value through a smooth bijection
//! onto the whole real line (the classic MINUIT-style transforms):
//!
//! - lower bound only: shifted hyperbola, `ext = min − 1 + √(int² + 1)`
//! - upper bound only: mirrored hyperbola
//! - two-sided: sine, `ext = min + (sin int + 1)·(max − min)/2`
//!
//! The chain-rule factor `d ext/d int` feeds the Jacobian, keeping the
//! minimizer's view of the problem consistent.
//!
//! Fitting code owns a plain parameter record plus a `Vec<ParamSpec>`; no
//! minimizer-specific parameter container leaks into the model.

use serde::{Deserialize, Serialize};

/// Box constraint for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    Free,
    /// `value >= min`.
    Min(f64),
    /// `value <= max`.
    Max(f64),
    /// `min <= value <= max`.
    Interval(f64, f64),
}

impl Bound {
    /// Whether `value` satisfies the constraint.
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Bound::Free => value.is_finite(),
            Bound::Min(mn) => value >= mn,
            Bound::Max(mx) => value <= mx,
            Bound::Interval(mn, mx) => (mn..=mx).contains(&value),
        }
    }

    /// Clamp a value into the constraint's closed domain.
    pub fn clamp(&self, value: f64) -> f64 {
        match *self {
            Bound::Free => value,
            Bound::Min(mn) => value.max(mn),
            Bound::Max(mx) => value.min(mx),
            Bound::Interval(mn, mx) => value.clamp(mn, mx),
        }
    }

    /// Map a (clamped) external value to the unbounded internal coordinate.
    pub fn to_internal(&self, ext: f64) -> f64 {
        let ext = self.clamp(ext);
        match *self {
            Bound::Free => ext,
            Bound::Min(mn) => ((ext - mn + 1.0).powi(2) - 1.0).max(0.0).sqrt(),
            Bound::Max(mx) => ((mx - ext + 1.0).powi(2) - 1.0).max(0.0).sqrt(),
            Bound::Interval(mn, mx) => {
                let u = (2.0 * (ext - mn) / (mx - mn) - 1.0).clamp(-1.0, 1.0);
                u.asin()
            }
        }
    }

    /// Map an internal coordinate back to the bounded external value.
    pub fn to_external(&self, int: f64) -> f64 {
        match *self {
            Bound::Free => int,
            Bound::Min(mn) => mn - 1.0 + (int * int + 1.0).sqrt(),
            Bound::Max(mx) => mx + 1.0 - (int * int + 1.0).sqrt(),
            Bound::Interval(mn, mx) => mn + (int.sin() + 1.0) * (mx - mn) / 2.0,
        }
    }

    /// Chain-rule factor `d external / d internal` at the internal coordinate.
    pub fn external_grad(&self, int: f64) -> f64 {
        match *self {
            Bound::Free => 1.0,
            Bound::Min(_) => int / (int * int + 1.0).sqrt(),
            Bound::Max(_) => -int / (int * int + 1.0).sqrt(),
            Bound::Interval(mn, mx) => int.cos() * (mx - mn) / 2.0,
        }
    }

    /// Intersect with another constraint (used to tighten the orientation
    /// window on top of the [0, 360) wrap bound).
    pub fn intersect(&self, other: Bound) -> Bound {
        let lo = match (self.lower(), other.lower()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let hi = match (self.upper(), other.upper()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        match (lo, hi) {
            (Some(mn), Some(mx)) => Bound::Interval(mn, mx),
            (Some(mn), None) => Bound::Min(mn),
            (None, Some(mx)) => Bound::Max(mx),
            (None, None) => Bound::Free,
        }
    }

    fn lower(&self) -> Option<f64> {
        match *self {
            Bound::Min(mn) | Bound::Interval(mn, _) => Some(mn),
            _ => None,
        }
    }

    fn upper(&self) -> Option<f64> {
        match *self {
            Bound::Max(mx) | Bound::Interval(_, mx) => Some(mx),
            _ => None,
        }
    }

    /// Human-readable form for reports.
    pub fn describe(&self) -> String {
        match *self {
            Bound::Free => "free".to_string(),
            Bound::Min(mn) => format!(">= {mn}"),
            Bound::Max(mx) => format!("<= {mx}"),
            Bound::Interval(mn, mx) => format!("[{mn}, {mx}]"),
        }
    }
}

/// One parameter's fitting state: initial value, constraint, and whether the
/// minimizer may vary it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub init: f64,
    pub bound: Bound,
    pub vary: bool,
}

impl ParamSpec {
    pub fn new(name: &'static str, init: f64, bound: Bound) -> Self {
        Self { name, init: bound.clamp(init), bound, vary: true }
    }

    /// A parameter held at its initial value for the whole fit.
    pub fn fixed(name: &'static str, init: f64) -> Self {
        Self { name, init, bound: Bound::Free, vary: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(bound: Bound, ext: f64) {
        let int = bound.to_internal(ext);
        let back = bound.to_external(int);
        assert!((back - ext).abs() < 1e-9, "{bound:?}: {ext} -> {int} -> {back}");
    }

    #[test]
    fn transforms_round_trip_inside_the_domain() {
        round_trip(Bound::Free, -3.5);
        round_trip(Bound::Min(0.0), 2.5);
        round_trip(Bound::Max(10.0), 2.5);
        round_trip(Bound::Interval(0.0, 360.0), 123.4);
    }

    #[test]
    fn external_values_never_leave_the_bounds() {
        let bound = Bound::Interval(0.0, 360.0);
        for int in [-100.0, -1.0, 0.0, 0.5, 3.0, 77.7] {
            let ext = bound.to_external(int);
            assert!((0.0..=360.0).contains(&ext), "internal {int} -> external {ext}");
        }
        let bound = Bound::Min(0.0);
        for int in [-5.0, 0.0, 5.0] {
            assert!(bound.to_external(int) >= 0.0);
        }
    }

    #[test]
    fn out_of_range_inits_are_clamped() {
        assert_eq!(Bound::Min(1.0).to_internal(0.5), 0.0);
        assert_eq!(Bound::Min(1.0).to_external(0.0), 1.0);
        let spec = ParamSpec::new("r0", -3.0, Bound::Min(0.0));
        assert_eq!(spec.init, 0.0);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let h = 1e-7;
        for bound in [
            Bound::Free,
            Bound::Min(0.0),
            Bound::Max(4.0),
            Bound::Interval(-2.0, 7.0),
        ] {
            for int in [-1.3, 0.2, 2.4] {
                let fd = (bound.to_external(int + h) - bound.to_external(int - h)) / (2.0 * h);
                let g = bound.external_grad(int);
                assert!((g - fd).abs() < 1e-6, "{bound:?} at {int}: {g} vs {fd}");
            }
        }
    }

    #[test]
    fn intersection_tightens_an_interval() {
        let wrap = Bound::Interval(0.0, 360.0);
        let window = Bound::Interval(80.0, 170.0);
        assert_eq!(wrap.intersect(window), Bound::Interval(80.0, 170.0));
        assert_eq!(wrap.intersect(Bound::Interval(-30.0, 45.0)), Bound::Interval(0.0, 45.0));
        assert_eq!(Bound::Min(0.0).intersect(Bound::Free), Bound::Min(0.0));
    }
}
