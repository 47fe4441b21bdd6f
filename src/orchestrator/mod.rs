//! End-to-end regime signal computation.
//!
//! Given already-fetched series and an `EngineConfig`, a run:
//!
//! 1. sanitizes every series and bounds a business-day grid by the anchor series
//! 2. aligns every series onto the grid with its publication lag
//! 3. derives secondary series and an expanding percentile for each column
//! 4. computes rolling correlations at the latest grid date
//! 5. runs the trigger event study against the configured outcome
//! 6. scores the regime at the latest grid date
//!
//! The run is pure: the same inputs and `computed_at` always produce the same
//! response. A missing or empty series degrades only what depends on it and is
//! reported as a warning; only a missing anchor or a too-short grid aborts.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::align::{LaggedSeries, align_multiple_series, sanitize_series, value_as_of};
use crate::backtest::{compute_forward_outcome, compute_trigger_stat};
use crate::calendar::build_grid;
use crate::config::{DerivedSeriesSpec, EngineConfig, PERCENTILE_SUFFIX, Transform};
use crate::correlation::compute_rolling_correlations;
use crate::domain::{
    AlignedSeries, AlignedSet, DataRange, DatasetDescriptor, Granularity, RegimeSignalsResponse, RunMetadata,
    TimePoint, TriggerStat,
};
use crate::error::SignalError;
use crate::math::{expanding_percentile, expanding_z_score, n_day_change, n_day_percent_change, rolling_mean};
use crate::scoring::{ComponentReading, compute_regime_score};
use crate::triggers::{SignalSnapshot, currently_firing, evaluate_over_grid};

/// Raw observations for one series plus its metadata.
#[derive(Debug, Clone)]
pub struct SeriesInput {
    pub descriptor: DatasetDescriptor,
    pub points: Vec<TimePoint>,
}

impl SeriesInput {
    pub fn new(descriptor: DatasetDescriptor, points: Vec<TimePoint>) -> Self {
        Self { descriptor, points }
    }
}

pub type SeriesInputs = BTreeMap<String, SeriesInput>;

/// Result of a run that did not abort.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Complete(Box<RegimeSignalsResponse>),
    /// Some inputs were missing or degraded; `warnings` says which.
    Partial {
        response: Box<RegimeSignalsResponse>,
        warnings: Vec<String>,
    },
}

impl RunOutcome {
    pub fn response(&self) -> &RegimeSignalsResponse {
        match self {
            RunOutcome::Complete(response) | RunOutcome::Partial { response, .. } => response,
        }
    }

    pub fn into_response(self) -> RegimeSignalsResponse {
        match self {
            RunOutcome::Complete(response) | RunOutcome::Partial { response, .. } => *response,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            RunOutcome::Complete(_) => &[],
            RunOutcome::Partial { warnings, .. } => warnings,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, RunOutcome::Partial { .. })
    }
}

/// Pair raw points with the config's dataset descriptors.
///
/// Points for ids the config does not declare are ignored; declared ids with
/// no points get an empty input so they surface as unavailable.
pub fn inputs_from_config(config: &EngineConfig, mut points: BTreeMap<String, Vec<TimePoint>>) -> SeriesInputs {
    config
        .datasets
        .iter()
        .map(|d| {
            let series = points.remove(&d.id).unwrap_or_default();
            (d.id.clone(), SeriesInput::new(d.clone(), series))
        })
        .collect()
}

/// Run the full engine at the latest date covered by the anchor series.
pub fn compute_regime_signals(
    inputs: &SeriesInputs,
    config: &EngineConfig,
    computed_at: DateTime<Utc>,
) -> Result<RunOutcome, SignalError> {
    config.validate()?;
    if let Some((id, input)) = inputs.iter().find(|(_, input)| input.descriptor.publication_lag_days < 0) {
        return Err(SignalError::InvalidConfig(format!(
            "series `{id}` has a negative publication lag ({})",
            input.descriptor.publication_lag_days
        )));
    }
    let mut warnings = Vec::new();

    // 1) Sanitize and bound the grid.
    let clean: BTreeMap<String, (i64, Vec<TimePoint>)> = inputs
        .iter()
        .map(|(id, input)| {
            let points = sanitize_series(&input.points, input.descriptor.start_date);
            debug!(
                series = %id,
                frequency = ?input.descriptor.frequency,
                lag_days = input.descriptor.publication_lag_days,
                kept = points.len(),
                dropped = input.points.len() - points.len(),
                "series sanitized"
            );
            if points.is_empty() {
                warn!(series = %id, "series has no usable observations");
                warnings.push(format!("{id}: no usable observations"));
            }
            (id.clone(), (input.descriptor.publication_lag_days, points))
        })
        .collect();

    let anchor = clean
        .get(&config.anchor_series)
        .map(|(_, points)| points)
        .filter(|points| !points.is_empty())
        .ok_or_else(|| SignalError::MissingAnchor {
            id: config.anchor_series.clone(),
        })?;
    let (start, end) = match (anchor.first(), anchor.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => {
            return Err(SignalError::MissingAnchor {
                id: config.anchor_series.clone(),
            });
        }
    };

    let grid = build_grid(start, end, Granularity::BusinessDay);
    if grid.len() < config.min_history_points {
        return Err(SignalError::InsufficientHistory {
            available: grid.len(),
            required: config.min_history_points,
        });
    }
    let last_index = grid.len() - 1;
    let as_of = grid[last_index];
    info!(%start, %end, grid_points = grid.len(), "grid built");

    // 2) Align primaries.
    let lagged: BTreeMap<String, LaggedSeries<'_>> = clean
        .iter()
        .map(|(id, (lag, points))| (id.clone(), LaggedSeries { points, lag_days: *lag }))
        .collect();
    let primaries = align_multiple_series(&lagged, &grid);

    let mut observed_on: HashMap<String, NaiveDate> = clean
        .iter()
        .filter_map(|(id, (lag, points))| value_as_of(points, as_of, *lag).map(|p| (id.clone(), p.date)))
        .collect();
    // Declared lag per signal; derived series inherit their source's.
    let mut lag_of: HashMap<String, i64> = clean.iter().map(|(id, (lag, _))| (id.clone(), *lag)).collect();

    // 3) Derived series and percentiles.
    let mut signals: AlignedSet = primaries.clone();
    for spec in &config.derived {
        let Some(source) = primaries.get(&spec.source) else {
            warnings.push(format!("{}: source series `{}` not supplied", spec.id, spec.source));
            continue;
        };
        signals.insert(spec.id.clone(), derive(spec, source, config.percentile_min_window));
        if let Some(date) = observed_on.get(&spec.source).copied() {
            observed_on.insert(spec.id.clone(), date);
        }
        if let Some(lag) = lag_of.get(&spec.source).copied() {
            lag_of.insert(spec.id.clone(), lag);
        }
    }
    let percentiles: Vec<(String, AlignedSeries)> = signals
        .iter()
        .map(|(id, col)| {
            (
                format!("{id}{PERCENTILE_SUFFIX}"),
                expanding_percentile(col, config.percentile_min_window),
            )
        })
        .collect();
    signals.extend(percentiles);
    debug!(columns = signals.len(), "signal set assembled");

    // 4) Correlations.
    let correlation_set = correlation_columns(config, &primaries, &mut warnings);
    let correlations = compute_rolling_correlations(&correlation_set, &grid, &config.correlation_windows);
    info!(windows = correlations.len(), series = correlation_set.len(), "correlations computed");

    for trigger in &config.triggers {
        for signal in trigger.condition.signals() {
            if !signals.contains_key(signal) {
                warnings.push(format!("trigger `{}` reads unknown signal `{signal}`", trigger.id));
            }
        }
    }

    // 5) Event study.
    let trigger_stats = event_study(config, &signals, grid.len(), &mut warnings);

    // 6) Regime score at the latest grid date.
    let snapshot = SignalSnapshot::at_index(&signals, last_index);
    let active_alerts: Vec<String> = currently_firing(&config.triggers, &snapshot, &config.thresholds)
        .into_iter()
        .map(|t| t.name.clone())
        .collect();

    let readings: Vec<_> = config
        .components
        .iter()
        .map(|spec| {
            let raw_value = signals.get(&spec.series).and_then(|col| col[last_index]);
            let percentile = signals
                .get(&format!("{}{PERCENTILE_SUFFIX}", spec.series))
                .and_then(|col| col[last_index]);
            let reading = ComponentReading {
                raw_value,
                percentile,
                as_of: raw_value.and_then(|_| observed_on.get(&spec.series).copied()),
                publication_lag_days: lag_of.get(&spec.series).copied().unwrap_or(0),
            };
            (spec.clone(), reading)
        })
        .collect();

    let mut regime = compute_regime_score(as_of, &readings, active_alerts);
    info!(score = regime.score, label = %regime.label, alerts = regime.active_alerts.len(), "regime scored");

    // Run-level warnings lead; component warnings follow.
    warnings.append(&mut regime.warnings);
    regime.warnings = warnings.clone();

    let response = Box::new(RegimeSignalsResponse {
        as_of,
        regime,
        correlations,
        trigger_stats,
        metadata: RunMetadata {
            computed_at,
            version: config.version.clone(),
            data_range: DataRange { start, end },
            grid_points: grid.len(),
            series_count: inputs.len(),
        },
    });

    if warnings.is_empty() {
        Ok(RunOutcome::Complete(response))
    } else {
        warn!(count = warnings.len(), "run completed with degraded inputs");
        Ok(RunOutcome::Partial { response, warnings })
    }
}

fn derive(spec: &DerivedSeriesSpec, source: &[Option<f64>], min_window: usize) -> AlignedSeries {
    match spec.transform {
        Transform::Change { periods } => n_day_change(source, periods),
        Transform::PercentChange { periods } => n_day_percent_change(source, periods),
        Transform::RollingMean { window } => rolling_mean(source, window),
        Transform::ZScore => expanding_z_score(source, min_window),
    }
}

fn correlation_columns(config: &EngineConfig, primaries: &AlignedSet, warnings: &mut Vec<String>) -> AlignedSet {
    if config.correlation_series.is_empty() {
        return primaries.clone();
    }
    let mut set = AlignedSet::new();
    for id in &config.correlation_series {
        match primaries.get(id) {
            Some(col) => {
                set.insert(id.clone(), col.clone());
            }
            None => warnings.push(format!("{id}: not supplied; excluded from correlations")),
        }
    }
    set
}

fn event_study(config: &EngineConfig, signals: &AlignedSet, len: usize, warnings: &mut Vec<String>) -> Vec<TriggerStat> {
    let Some(outcome) = &config.outcome else {
        return Vec::new();
    };
    if config.triggers.is_empty() {
        return Vec::new();
    }

    let Some(column) = signals.get(&outcome.series).filter(|col| col.iter().any(Option::is_some)) else {
        warnings.push(format!(
            "{}: outcome series unavailable; trigger statistics skipped",
            outcome.series
        ));
        return Vec::new();
    };

    let indicator = outcome.rule.indicator(column);
    let forward = compute_forward_outcome(&indicator, outcome.horizon_days);
    let fired = evaluate_over_grid(&config.triggers, signals, &config.thresholds, len);

    let stats: Vec<TriggerStat> = config
        .triggers
        .iter()
        .filter_map(|t| {
            fired
                .get(&t.id)
                .map(|col| compute_trigger_stat(t, col, &forward, outcome.horizon_days))
        })
        .collect();
    info!(triggers = stats.len(), horizon = outcome.horizon_days, "trigger statistics computed");
    stats
}
