//! Percentile and aggregation helpers over numeric samples.
//!
//! `percentile` and `median` are deliberately distinct: the hourly
//! climatology uses interpolated percentiles, while the monthly aggregation
//! uses classic midpoint-averaging medians. They agree for odd-length
//! inputs and may differ for even lengths.

/// Linearly-interpolated percentile of `samples` at `p` (0-100), rounded to
/// one decimal. The input is not mutated (a copy is sorted). Returns `None`
/// for an empty sample set.
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = (p / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let value = sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64);
    Some(round1(value))
}

/// Median with even-length midpoint averaging. Returns `None` for an empty
/// sample set.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Arithmetic mean, `None` for an empty sample set.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_empty() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn percentile_single() {
        assert_eq!(percentile(&[3.0], 0.0), Some(3.0));
        assert_eq!(percentile(&[3.0], 100.0), Some(3.0));
    }

    #[test]
    fn percentile_interpolates() {
        // pos = 0.5 * 3 = 1.5 -> between 2nd and 3rd sorted values
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), Some(2.5));
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 25.0), Some(1.8));
    }

    #[test]
    fn percentile_does_not_mutate_input() {
        let samples = vec![3.0, 1.0, 2.0];
        let _ = percentile(&samples, 50.0);
        assert_eq!(samples, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn percentile_monotonic_in_p() {
        let samples = [7.2, -1.0, 3.3, 12.8, 5.5, 0.4];
        let mut prev = f64::NEG_INFINITY;
        for p in (0..=100).step_by(5) {
            let v = percentile(&samples, p as f64).unwrap();
            assert!(v >= prev, "p={p}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn median_odd_matches_percentile50() {
        let samples = [5.0, 1.0, 9.0];
        assert_eq!(median(&samples), percentile(&samples, 50.0));
    }

    #[test]
    fn median_even_differs_from_interpolated_percentile_by_design() {
        // Midpoint averaging vs linear interpolation at (n-1)/2: both give
        // the average of the two central values here, but uneven spacing
        // with rounding shows the functions are not interchangeable.
        let samples = [1.0, 2.0, 10.0, 11.0];
        assert_eq!(median(&samples), Some(6.0));
        assert_eq!(percentile(&samples, 50.0), Some(6.0));
        // toFixed-style rounding applies only to percentile.
        let samples = [1.05, 2.0];
        assert_eq!(median(&samples), Some(1.525));
        assert_eq!(percentile(&samples, 50.0), Some(1.5));
    }

    #[test]
    fn mean_basic() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
