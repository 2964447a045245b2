// src/analytics/stats.rs
//
// Robust numeric helpers. Listing prices are heavy-tailed, so the segment
// statistics lean on medians, quantiles and MAD rather than means.

/// Median of a sample; None when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linear-interpolation quantile, q in [0, 1]; None when empty.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] * (1.0 - frac) + sorted[hi] * frac)
}

/// Median absolute deviation from the median.
pub fn mad(values: &[f64]) -> Option<f64> {
    let med = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    median(&deviations)
}

/// Weighted median: the value at which cumulative weight crosses half of
/// the total. Items with non-positive weight are ignored.
pub fn weighted_median(pairs: &[(f64, f64)]) -> Option<f64> {
    let mut items: Vec<(f64, f64)> = pairs.iter().copied().filter(|(_, w)| *w > 0.0).collect();
    if items.is_empty() {
        return None;
    }
    items.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total: f64 = items.iter().map(|(_, w)| w).sum();
    let mut acc = 0.0;
    for (value, weight) in &items {
        acc += weight;
        if acc >= total / 2.0 {
            return Some(*value);
        }
    }
    items.last().map(|(v, _)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(5.0));
        assert_eq!(quantile(&v, 0.25), Some(2.0));
        assert_eq!(quantile(&v, 0.75), Some(4.0));
    }

    #[test]
    fn mad_is_robust_to_one_outlier() {
        let v = [10.0, 11.0, 12.0, 13.0, 1000.0];
        assert_eq!(mad(&v), Some(1.0));
    }

    #[test]
    fn weighted_median_respects_weights() {
        let pairs = [(1.0, 1.0), (2.0, 1.0), (100.0, 10.0)];
        assert_eq!(weighted_median(&pairs), Some(100.0));
        assert_eq!(weighted_median(&[]), None);
    }
}
