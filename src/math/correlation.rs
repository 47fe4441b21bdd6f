//! Correlation coefficients.
//!
//! Numerical notes:
//! - Pearson is computed from mean-centered sums (two passes) rather than raw
//!   moment sums, which lose precision for series with a large level relative
//!   to their variation (e.g. spreads quoted in bp).
//! - Spearman is Pearson over fractional ranks, so ties receive their average rank.

use std::cmp::Ordering;

/// Product-moment correlation.
///
/// Returns NaN when fewer than 2 points are supplied, the lengths differ, or
/// either input has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return f64::NAN;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xv, yv) in x.iter().zip(y) {
        let dx = xv - mean_x;
        let dy = yv - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if !r.is_finite() {
        return f64::NAN;
    }
    r.clamp(-1.0, 1.0)
}

/// Rank correlation: Pearson over average-tie ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    pearson(&fractional_ranks(x), &fractional_ranks(y))
}

/// 1-based ranks where tied values share the mean of the ranks they span.
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) hold ranks start+1..=end.
        let avg = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        start = end;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn random_series(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-3.0..3.0)).collect()
    }

    #[test]
    fn pearson_self_is_one() {
        let x = random_series(1, 50);
        assert!((pearson(&x, &x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_negated_is_minus_one() {
        let x = random_series(2, 50);
        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!((pearson(&x, &neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_degenerate_inputs_are_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn pearson_stable_at_large_offsets() {
        let x: Vec<f64> = (0..100).map(|i| 1e9 + i as f64).collect();
        let y: Vec<f64> = (0..100).map(|i| 5e8 + 2.0 * i as f64).collect();
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ranks_average_ties() {
        let r = fractional_ranks(&[10.0, 20.0, 10.0, 30.0, 20.0]);
        assert_eq!(r, vec![1.5, 3.5, 1.5, 5.0, 3.5]);
    }

    #[test]
    fn spearman_invariant_under_monotone_transforms() {
        let x = random_series(3, 80);
        let y: Vec<f64> = x
            .iter()
            .zip(random_series(4, 80))
            .map(|(a, noise)| a + 0.8 * noise)
            .collect();
        let base = spearman(&x, &y);

        let x_exp: Vec<f64> = x.iter().map(|v| v.exp()).collect();
        let y_cubed: Vec<f64> = y.iter().map(|v| v.powi(3) + 7.0).collect();
        assert!((spearman(&x_exp, &y) - base).abs() < 1e-12);
        assert!((spearman(&x, &y_cubed) - base).abs() < 1e-12);
        assert!((spearman(&x_exp, &y_cubed) - base).abs() < 1e-12);
    }

    #[test]
    fn spearman_detects_nonlinear_monotone_relation() {
        let x: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v.powi(5)).collect();
        assert!((spearman(&x, &y) - 1.0).abs() < 1e-12);
        assert!(pearson(&x, &y) < 0.99);
    }
}
