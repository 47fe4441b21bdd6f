//! Causal statistics over aligned series.
//!
//! Every function here maps an aligned `[Option<f64>]` column to a new column of
//! the same length, and the output at index `i` reads only inputs at `0..=i`.
//! Appending values after `i` can never change output `i`.

use crate::domain::AlignedSeries;

/// Trailing mean over the non-null values in `[i - window + 1, i]`.
///
/// `None` until index `window - 1`, and wherever the window holds no values.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> AlignedSeries {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..values.len() {
        if let Some(v) = values[i] {
            sum += v;
            count += 1;
        }
        if i >= window {
            if let Some(old) = values[i - window] {
                sum -= old;
                count -= 1;
            }
        }
        if i + 1 >= window && count > 0 {
            out[i] = Some(sum / count as f64);
        }
    }
    out
}

/// `value[i] - value[i - n]`.
pub fn n_day_change(values: &[Option<f64>], n: usize) -> AlignedSeries {
    lagged_pairs(values, n, |current, previous| Some(current - previous))
}

/// Percent change `(value[i] / value[i - n] - 1) * 100`. `None` when the base is zero.
pub fn n_day_percent_change(values: &[Option<f64>], n: usize) -> AlignedSeries {
    lagged_pairs(values, n, |current, previous| {
        if previous == 0.0 {
            None
        } else {
            Some((current - previous) / previous.abs() * 100.0)
        }
    })
}

fn lagged_pairs(
    values: &[Option<f64>],
    n: usize,
    f: impl Fn(f64, f64) -> Option<f64>,
) -> AlignedSeries {
    (0..values.len())
        .map(|i| {
            if i < n {
                return None;
            }
            match (values[i], values[i - n]) {
                (Some(current), Some(previous)) => f(current, previous),
                _ => None,
            }
        })
        .collect()
}

/// Percentile rank (0..100) of `value[i]` among all non-null values in `[0, i]`.
///
/// Rank is `(count(v <= current) - 1) / (total - 1) * 100`, clamped to `[0, 100]`.
/// `None` until `min_window` non-null observations have accumulated. A single
/// observation ranks at 100.
pub fn expanding_percentile(values: &[Option<f64>], min_window: usize) -> AlignedSeries {
    let min_window = min_window.max(1);
    let mut sorted: Vec<f64> = Vec::with_capacity(values.len());
    let mut out = Vec::with_capacity(values.len());

    for value in values {
        let Some(current) = *value else {
            out.push(None);
            continue;
        };
        let pos = sorted.partition_point(|v| *v <= current);
        sorted.insert(pos, current);

        let total = sorted.len();
        if total < min_window {
            out.push(None);
            continue;
        }
        if total == 1 {
            out.push(Some(100.0));
            continue;
        }
        // `pos + 1` values (including the one just inserted) are <= current.
        let rank = pos as f64 / (total - 1) as f64 * 100.0;
        out.push(Some(rank.clamp(0.0, 100.0)));
    }
    out
}

/// Expanding z-score `(value[i] - mean[0..=i]) / std[0..=i]`.
///
/// Uses the population standard deviation accumulated with Welford's update.
/// Returns 0 when the standard deviation is 0, `None` before `min_window`
/// non-null observations.
pub fn expanding_z_score(values: &[Option<f64>], min_window: usize) -> AlignedSeries {
    let min_window = min_window.max(1);
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    let mut out = Vec::with_capacity(values.len());

    for value in values {
        let Some(current) = *value else {
            out.push(None);
            continue;
        };
        count += 1;
        let delta = current - mean;
        mean += delta / count as f64;
        m2 += delta * (current - mean);

        if count < min_window {
            out.push(None);
            continue;
        }
        let std = (m2 / count as f64).max(0.0).sqrt();
        if std <= f64::EPSILON * mean.abs().max(1.0) {
            out.push(Some(0.0));
        } else {
            out.push(Some((current - mean) / std));
        }
    }
    out
}
