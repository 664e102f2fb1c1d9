//! Small order-statistics helpers used by the initial-guess heuristic.

/// Median of a sample (copy + sort; inputs stay untouched).
///
/// Returns `None` for an empty sample. Non-finite values sort to one end via
/// the total-order fallback, so callers are expected to validate inputs first.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    median_mut(&mut sorted)
}

/// Median of a mutable sample (sorts in place).
pub fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Indices of the `k` smallest values (ties broken by index, deterministic).
///
/// Used to pick the points closest to the trial focus. `k` is clamped to the
/// sample length.
pub fn smallest_k_indices(values: &[f64], k: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    idx.truncate(k.min(values.len()));
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn smallest_k_is_deterministic_under_ties() {
        let v = [2.0, 1.0, 1.0, 0.5];
        assert_eq!(smallest_k_indices(&v, 3), vec![3, 1, 2]);
        // k larger than the sample is clamped.
        assert_eq!(smallest_k_indices(&v, 10).len(), 4);
    }
}
