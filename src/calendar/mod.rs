//! Calendar grid generation.
//!
//! A grid is the common, strictly ascending time axis for one computation run.
//! Grids are produced lazily by `DateGrid`; the iterator is `Clone`, so a caller
//! can restart it by cloning before consuming.
//!
//! Business days exclude Saturday and Sunday only. There is no holiday calendar.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::Granularity;

/// Weekday used by the `Weekly` granularity.
pub const WEEKLY_ANCHOR: Weekday = Weekday::Fri;

/// Lazy, finite sequence of grid dates in `[start, end]`.
#[derive(Debug, Clone)]
pub struct DateGrid {
    next: Option<NaiveDate>,
    end: NaiveDate,
    granularity: Granularity,
}

impl DateGrid {
    /// Build a grid over `[start, end]`. `end < start` yields an empty sequence.
    pub fn new(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Self {
        let first = match granularity {
            Granularity::Daily => Some(start),
            Granularity::BusinessDay => first_business_day_on_or_after(start),
            Granularity::Weekly => first_weekday_on_or_after(start, WEEKLY_ANCHOR),
        };
        Self {
            next: first.filter(|d| *d <= end),
            end,
            granularity,
        }
    }

    fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.granularity {
            Granularity::Daily => date.succ_opt(),
            Granularity::BusinessDay => date.succ_opt().and_then(first_business_day_on_or_after),
            Granularity::Weekly => date.checked_add_signed(Duration::days(7)),
        }
    }
}

impl Iterator for DateGrid {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = self.advance(current).filter(|d| *d <= self.end);
        Some(current)
    }
}

/// Collect a grid into a vector.
pub fn build_grid(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    DateGrid::new(start, end, granularity).collect()
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn first_business_day_on_or_after(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_add_signed(Duration::days(2)),
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

fn first_weekday_on_or_after(date: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let offset = (7 + target.num_days_from_monday() as i64
        - date.weekday().num_days_from_monday() as i64)
        % 7;
    date.checked_add_signed(Duration::days(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_includes_both_endpoints() {
        let grid = build_grid(d(2024, 2, 27), d(2024, 3, 2), Granularity::Daily);
        assert_eq!(grid.len(), 5); // leap day included
        assert_eq!(grid[0], d(2024, 2, 27));
        assert_eq!(grid[2], d(2024, 2, 29));
        assert_eq!(*grid.last().unwrap(), d(2024, 3, 2));
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-06-01 is a Saturday.
        let grid = build_grid(d(2024, 6, 1), d(2024, 6, 16), Granularity::BusinessDay);
        assert_eq!(grid.len(), 10);
        assert_eq!(grid[0], d(2024, 6, 3));
        assert!(grid.iter().all(|x| is_business_day(*x)));
        assert_eq!(*grid.last().unwrap(), d(2024, 6, 14));
    }

    #[test]
    fn weekly_lands_on_fridays() {
        let grid = build_grid(d(2024, 6, 1), d(2024, 6, 30), Granularity::Weekly);
        assert_eq!(grid, vec![d(2024, 6, 7), d(2024, 6, 14), d(2024, 6, 21), d(2024, 6, 28)]);
    }

    #[test]
    fn weekly_starting_on_friday_keeps_start() {
        let grid = build_grid(d(2024, 6, 7), d(2024, 6, 7), Granularity::Weekly);
        assert_eq!(grid, vec![d(2024, 6, 7)]);
    }

    #[test]
    fn reversed_range_is_empty() {
        for g in [Granularity::Daily, Granularity::BusinessDay, Granularity::Weekly] {
            assert!(build_grid(d(2024, 6, 10), d(2024, 6, 1), g).is_empty());
        }
    }

    #[test]
    fn weekend_only_range_has_no_business_days() {
        assert!(build_grid(d(2024, 6, 1), d(2024, 6, 2), Granularity::BusinessDay).is_empty());
    }

    #[test]
    fn grid_is_strictly_ascending_and_restartable() {
        let grid = DateGrid::new(d(2023, 12, 20), d(2024, 1, 20), Granularity::BusinessDay);
        let first: Vec<_> = grid.clone().collect();
        let second: Vec<_> = grid.collect();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }
}
