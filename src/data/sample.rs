//! Synthetic market scenario for demos and end-to-end checks.
//!
//! Three business-day series over a configurable span:
//!
//! - `hy_oas`: sine oscillation between 3% and 8%
//! - `vix`: an exact linear image of `hy_oas` onto 12..40 (perfect co-movement)
//! - `yield_curve_spread`: differenced uniform noise spanning -1%..2%, independent of
//!   the other two. Differencing keeps the noise free of low-frequency drift, so
//!   short-window correlations against the smooth spread cycle stay near zero.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::calendar::build_grid;
use crate::domain::{Granularity, TimePoint};
use crate::error::AppError;

const HY_MIN: f64 = 3.0;
const HY_MAX: f64 = 8.0;
const VIX_MIN: f64 = 12.0;
const VIX_MAX: f64 = 40.0;
const CURVE_MID: f64 = 0.5;
const CURVE_HALF_RANGE: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub start: NaiveDate,
    pub years: u32,
    pub seed: u64,
    /// Length of one full `hy_oas` cycle in business days.
    pub cycle_days: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap_or_default(),
            years: 3,
            seed: 42,
            cycle_days: 250,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub series: BTreeMap<String, Vec<TimePoint>>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn generate_scenario(config: &ScenarioConfig) -> Result<Scenario, AppError> {
    if config.years == 0 {
        return Err(AppError::new(2, "Scenario span must be at least one year."));
    }
    if config.cycle_days < 2 {
        return Err(AppError::new(2, "Scenario cycle must be at least 2 days."));
    }

    let end = config
        .start
        .checked_add_signed(Duration::days(365 * i64::from(config.years)))
        .ok_or_else(|| AppError::new(2, "Scenario end date overflows the calendar."))?;
    let dates = build_grid(config.start, end, Granularity::BusinessDay);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let uniform = Uniform::new(-1.0, 1.0);

    let mid = (HY_MIN + HY_MAX) / 2.0;
    let amp = (HY_MAX - HY_MIN) / 2.0;
    let phase = std::f64::consts::TAU / config.cycle_days as f64;

    let mut hy = Vec::with_capacity(dates.len());
    let mut vix = Vec::with_capacity(dates.len());
    let mut curve = Vec::with_capacity(dates.len());

    let mut prev_noise: f64 = uniform.sample(&mut rng);
    for (t, date) in dates.iter().enumerate() {
        let hy_value = mid + amp * (phase * t as f64).sin();
        let vix_value = VIX_MIN + (hy_value - HY_MIN) / (HY_MAX - HY_MIN) * (VIX_MAX - VIX_MIN);

        let noise: f64 = uniform.sample(&mut rng);
        let curve_value = CURVE_MID + CURVE_HALF_RANGE / 2.0 * (noise - prev_noise);
        prev_noise = noise;

        hy.push(TimePoint::new(*date, hy_value));
        vix.push(TimePoint::new(*date, vix_value));
        curve.push(TimePoint::new(*date, curve_value));
    }

    let mut series = BTreeMap::new();
    series.insert("hy_oas".to_string(), hy);
    series.insert("vix".to_string(), vix);
    series.insert("yield_curve_spread".to_string(), curve);

    Ok(Scenario {
        series,
        start: config.start,
        end,
    })
}
