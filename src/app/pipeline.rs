//! Shared pipelines behind the CLI commands.
//!
//! Each pipeline gathers inputs (files, FRED, or the synthetic scenario) and
//! hands them to the engine; presentation stays in `app`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::data::{ScenarioConfig, generate_scenario};
use crate::domain::TimePoint;
use crate::error::AppError;
use crate::io::{load_series_dir, series_path, write_series_csv};
use crate::orchestrator::{RunOutcome, compute_regime_signals, inputs_from_config};

/// Load every configured series from `data_dir` and run the engine.
pub fn run_from_dir(config: &EngineConfig, data_dir: &Path, computed_at: DateTime<Utc>) -> Result<RunOutcome, AppError> {
    let inputs = load_series_dir(config, data_dir)?;
    info!(data_dir = %data_dir.display(), series = inputs.len(), "series loaded");
    Ok(compute_regime_signals(&inputs, config, computed_at)?)
}

/// Generate the synthetic scenario and run the engine on it.
pub fn run_demo(
    scenario: &ScenarioConfig,
    config: &EngineConfig,
    computed_at: DateTime<Utc>,
) -> Result<RunOutcome, AppError> {
    let generated = generate_scenario(scenario)?;
    info!(start = %generated.start, end = %generated.end, seed = scenario.seed, "synthetic scenario generated");
    let inputs = inputs_from_config(config, generated.series);
    Ok(compute_regime_signals(&inputs, config, computed_at)?)
}

/// What a fetch pass did, per series id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchSummary {
    pub written: Vec<String>,
    pub reused: Vec<String>,
    /// Datasets without a `fred_id`.
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Fetch every dataset carrying a `fred_id` into `dir` as `<id>.csv`.
///
/// Existing files are kept unless `refresh` is set. A failed series is logged
/// and skipped; the pass only fails when nothing could be written or reused.
pub fn fetch_into_dir<F>(config: &EngineConfig, dir: &Path, refresh: bool, mut fetch: F) -> Result<FetchSummary, AppError>
where
    F: FnMut(&str, Option<NaiveDate>) -> Result<Vec<TimePoint>, AppError>,
{
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create data directory '{}': {e}", dir.display())))?;

    let mut summary = FetchSummary::default();
    for descriptor in &config.datasets {
        let Some(fred_id) = descriptor.fred_id.as_deref() else {
            summary.skipped.push(descriptor.id.clone());
            continue;
        };

        let path = series_path(dir, &descriptor.id);
        if path.exists() && !refresh {
            summary.reused.push(descriptor.id.clone());
            continue;
        }

        match fetch(fred_id, descriptor.start_date) {
            Ok(points) => {
                write_series_csv(&path, &points)?;
                info!(series = %descriptor.id, fred_id, points = points.len(), "series written");
                summary.written.push(descriptor.id.clone());
            }
            Err(err) => {
                warn!(series = %descriptor.id, fred_id, "fetch failed: {err}");
                summary.failed.push((descriptor.id.clone(), err.to_string()));
            }
        }
    }

    if !summary.failed.is_empty() && summary.written.is_empty() && summary.reused.is_empty() {
        return Err(AppError::new(4, "No series could be fetched from FRED."));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatasetDescriptor, Frequency};
    use crate::orchestrator::SeriesInputs;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-02-01T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn fake_points(n: usize) -> Vec<TimePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| TimePoint::new(start + chrono::Duration::days(i as i64), i as f64))
            .collect()
    }

    #[test]
    fn fetch_writes_reuses_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.datasets.push(DatasetDescriptor::new("local_only", Frequency::Daily, 0));
        std::fs::write(series_path(dir.path(), "vix"), "date,value\n2024-01-02,13\n").unwrap();

        let mut calls = Vec::new();
        let summary = fetch_into_dir(&config, dir.path(), false, |id, _| {
            calls.push(id.to_string());
            Ok(fake_points(5))
        })
        .unwrap();

        assert_eq!(summary.reused, ["vix"]);
        assert_eq!(summary.skipped, ["local_only"]);
        assert_eq!(summary.written, ["hy_oas", "yield_curve_spread"]);
        assert_eq!(calls, ["BAMLH0A0HYM2", "T10Y2Y"]);

        let inputs: SeriesInputs = load_series_dir(&config, dir.path()).unwrap();
        assert_eq!(inputs["hy_oas"].points.len(), 5);
        assert_eq!(inputs["vix"].points.len(), 1);
    }

    #[test]
    fn refresh_refetches_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        std::fs::write(series_path(dir.path(), "vix"), "date,value\n2024-01-02,13\n").unwrap();

        let summary = fetch_into_dir(&config, dir.path(), true, |_, _| Ok(fake_points(3))).unwrap();
        assert_eq!(summary.written.len(), 3);
        assert!(summary.reused.is_empty());
    }

    #[test]
    fn partial_fetch_failure_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        let summary = fetch_into_dir(&config, dir.path(), false, |id, _| {
            if id == "VIXCLS" {
                Err(AppError::new(4, "status 500"))
            } else {
                Ok(fake_points(2))
            }
        })
        .unwrap();
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "vix");
    }

    #[test]
    fn total_fetch_failure_is_an_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch_into_dir(&EngineConfig::default(), dir.path(), false, |_, _| {
            Err(AppError::new(4, "offline"))
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn demo_runs_end_to_end() {
        let outcome = run_demo(&ScenarioConfig::default(), &EngineConfig::default(), at()).unwrap();
        assert_eq!(outcome.response().metadata.computed_at, at());
    }

    #[test]
    fn short_files_map_to_insufficient_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::default();
        for d in &config.datasets {
            write_series_csv(&series_path(dir.path(), &d.id), &fake_points(30)).unwrap();
        }
        let err = run_from_dir(&config, dir.path(), at()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
