//! Point-in-time alignment of source series onto a grid.
//!
//! The value at grid position `i` is the last observation whose date is on or
//! before `grid[i] - lag_days`. Nothing after that cutoff is ever read, so an
//! aligned column can be recomputed from the data that existed at `grid[i]`.
//!
//! This module never looks forward. Forward-looking outcome labels used for
//! backtesting live in `crate::backtest`.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::domain::{AlignedSeries, AlignedSet, TimePoint};

/// A source series plus the publication lag applied when aligning it.
#[derive(Debug, Clone, Copy)]
pub struct LaggedSeries<'a> {
    pub points: &'a [TimePoint],
    pub lag_days: i64,
}

/// Last point knowable as of `as_of`, i.e. with `date <= as_of - lag_days`.
///
/// `series` must be sorted ascending by date. Runs in O(log n). A negative lag
/// is treated as zero: the cutoff never moves past `as_of`.
pub fn value_as_of(series: &[TimePoint], as_of: NaiveDate, lag_days: i64) -> Option<TimePoint> {
    let cutoff = as_of.checked_sub_signed(Duration::days(lag_days.max(0)))?;
    let idx = series.partition_point(|p| p.date <= cutoff);
    if idx == 0 {
        return None;
    }
    Some(series[idx - 1])
}

/// Apply `value_as_of` at every grid date. Output length equals grid length.
pub fn align_to_grid(series: &[TimePoint], grid: &[NaiveDate], lag_days: i64) -> AlignedSeries {
    grid.iter()
        .map(|d| value_as_of(series, *d, lag_days).map(|p| p.value))
        .collect()
}

/// Align several named series onto one grid.
pub fn align_multiple_series(
    inputs: &BTreeMap<String, LaggedSeries<'_>>,
    grid: &[NaiveDate],
) -> AlignedSet {
    inputs
        .iter()
        .map(|(id, s)| (id.clone(), align_to_grid(s.points, grid, s.lag_days)))
        .collect()
}

/// Prepare raw observations for alignment.
///
/// Drops non-finite values and anything before `start_date`, sorts ascending,
/// and keeps the last observation when a date repeats.
pub fn sanitize_series(points: &[TimePoint], start_date: Option<NaiveDate>) -> Vec<TimePoint> {
    let mut out: Vec<TimePoint> = points
        .iter()
        .filter(|p| p.value.is_finite())
        .filter(|p| start_date.is_none_or(|s| p.date >= s))
        .copied()
        .collect();
    // Stable sort preserves input order among equal dates, so the later
    // duplicate wins below.
    out.sort_by_key(|p| p.date);

    let mut deduped: Vec<TimePoint> = Vec::with_capacity(out.len());
    for p in out {
        match deduped.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => deduped.push(p),
        }
    }
    deduped
}
