//! Rolling and pairwise correlation engine.
//!
//! Windows are trailing and index-based: a window of 60 at grid index `i` covers
//! positions `[i - 59, i]`. Positions where either side is null are dropped, and
//! a window with fewer than `MIN_VALID_PAIRS` remaining pairs yields no
//! coefficient. A missing coefficient means "not enough data", not a failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AlignedSeries, AlignedSet, CorrelationMethod, CorrelationPair, RollingCorrelationWindow};
use crate::math::{pearson, spearman};

/// Minimum number of valid paired observations for a coefficient.
pub const MIN_VALID_PAIRS: usize = 10;

/// A named trailing window length, e.g. `60d` over 60 grid points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationWindowSpec {
    pub label: String,
    pub days: usize,
}

impl CorrelationWindowSpec {
    pub fn new(label: impl Into<String>, days: usize) -> Self {
        Self {
            label: label.into(),
            days,
        }
    }
}

/// Valid `(x, y)` pairs in the trailing window ending at `end_index` (inclusive).
fn paired_window(x: &[Option<f64>], y: &[Option<f64>], end_index: usize, window: usize) -> (Vec<f64>, Vec<f64>) {
    let len = x.len().min(y.len());
    if window == 0 || end_index >= len {
        return (Vec::new(), Vec::new());
    }
    let start = (end_index + 1).saturating_sub(window);

    let mut xs = Vec::with_capacity(window);
    let mut ys = Vec::with_capacity(window);
    for i in start..=end_index {
        if let (Some(a), Some(b)) = (x[i], y[i]) {
            xs.push(a);
            ys.push(b);
        }
    }
    (xs, ys)
}

fn coefficient(xs: &[f64], ys: &[f64], method: CorrelationMethod) -> Option<f64> {
    if xs.len() < MIN_VALID_PAIRS {
        return None;
    }
    let r = match method {
        CorrelationMethod::Pearson => pearson(xs, ys),
        CorrelationMethod::Spearman => spearman(xs, ys),
    };
    r.is_finite().then_some(r)
}

/// Correlation over the trailing `window` at every grid index.
pub fn rolling_correlation(
    x: &[Option<f64>],
    y: &[Option<f64>],
    window: usize,
    method: CorrelationMethod,
) -> AlignedSeries {
    let len = x.len().min(y.len());
    (0..len)
        .map(|i| {
            let (xs, ys) = paired_window(x, y, i, window);
            coefficient(&xs, &ys, method)
        })
        .collect()
}

/// Pearson and Spearman for every unordered pair of series at one grid index.
///
/// Pairs are emitted in id order (`a < b`); an undersized pair is kept with
/// both coefficients set to `None`.
pub fn compute_correlation_pairs(set: &AlignedSet, end_index: usize, window: usize) -> Vec<CorrelationPair> {
    let columns: Vec<(&String, &AlignedSeries)> = set.iter().collect();
    let mut pairs = Vec::new();

    for (i, (id_a, col_a)) in columns.iter().enumerate() {
        for (id_b, col_b) in columns.iter().skip(i + 1) {
            let (xs, ys) = paired_window(col_a, col_b, end_index, window);
            pairs.push(CorrelationPair {
                series_a: (*id_a).clone(),
                series_b: (*id_b).clone(),
                pearson: coefficient(&xs, &ys, CorrelationMethod::Pearson),
                spearman: coefficient(&xs, &ys, CorrelationMethod::Spearman),
                observations: xs.len(),
            });
        }
    }
    pairs
}

/// One `RollingCorrelationWindow` per requested length, anchored at the latest grid index.
pub fn compute_rolling_correlations(
    set: &AlignedSet,
    grid: &[NaiveDate],
    windows: &[CorrelationWindowSpec],
) -> Vec<RollingCorrelationWindow> {
    let Some(as_of) = grid.last().copied() else {
        return Vec::new();
    };
    let end_index = grid.len() - 1;

    windows
        .iter()
        .map(|w| RollingCorrelationWindow {
            as_of,
            window_label: w.label.clone(),
            window_days: w.days,
            pairs: compute_correlation_pairs(set, end_index, w.days),
        })
        .collect()
}
