//! Engine configuration.
//!
//! Everything that varies between regime models lives here rather than in
//! code: dataset metadata, derived series, component weights, trigger
//! definitions, thresholds and the outcome used for the event study. The
//! configuration is passed into the orchestrator at call time; there is no
//! process-wide registry.
//!
//! Files are JSON. Every field has a default, so a partial file only
//! overrides what it names.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backtest::OutcomeRule;
use crate::correlation::CorrelationWindowSpec;
use crate::domain::{DatasetDescriptor, Frequency};
use crate::error::{AppError, SignalError};
use crate::scoring::ComponentSpec;
use crate::triggers::{Threshold, TriggerCondition, TriggerDefinition, TriggerThresholds};

/// Suffix of the expanding-percentile companion generated for every series.
pub const PERCENTILE_SUFFIX: &str = "_pctl";

/// A secondary series computed from an aligned primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeriesSpec {
    pub id: String,
    pub source: String,
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Change { periods: usize },
    PercentChange { periods: usize },
    RollingMean { window: usize },
    ZScore,
}

/// Which series drives the forward-outcome labels of the event study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub series: String,
    pub rule: OutcomeRule,
    pub horizon_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub version: String,
    /// Series whose first and last dates bound the grid.
    pub anchor_series: String,
    /// Minimum grid length before a run is attempted.
    pub min_history_points: usize,
    /// Non-null observations required before a percentile or z-score is emitted.
    pub percentile_min_window: usize,
    pub correlation_windows: Vec<CorrelationWindowSpec>,
    /// Series included in pairwise correlations. Empty means every primary series.
    pub correlation_series: Vec<String>,
    pub datasets: Vec<DatasetDescriptor>,
    pub derived: Vec<DerivedSeriesSpec>,
    pub components: Vec<ComponentSpec>,
    pub triggers: Vec<TriggerDefinition>,
    pub thresholds: TriggerThresholds,
    pub outcome: Option<OutcomeSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "regime-signals/1".to_string(),
            anchor_series: "hy_oas".to_string(),
            // Two years of business days.
            min_history_points: 504,
            percentile_min_window: 60,
            correlation_windows: vec![
                CorrelationWindowSpec::new("60d", 60),
                CorrelationWindowSpec::new("126d", 126),
            ],
            correlation_series: Vec::new(),
            datasets: default_datasets(),
            derived: vec![
                DerivedSeriesSpec {
                    id: "hy_oas_chg_20d".to_string(),
                    source: "hy_oas".to_string(),
                    transform: Transform::Change { periods: 20 },
                },
                DerivedSeriesSpec {
                    id: "vix_z".to_string(),
                    source: "vix".to_string(),
                    transform: Transform::ZScore,
                },
            ],
            components: default_components(),
            triggers: default_triggers(),
            thresholds: HashMap::from([
                ("hy_pctl_tight".to_string(), 20.0),
                ("vix_high".to_string(), 25.0),
                ("hy_widening".to_string(), 0.5),
            ]),
            outcome: Some(OutcomeSpec {
                series: "vix".to_string(),
                rule: OutcomeRule::Above { level: 30.0 },
                horizon_days: 20,
            }),
        }
    }
}

fn default_datasets() -> Vec<DatasetDescriptor> {
    let mut hy = DatasetDescriptor::new("hy_oas", Frequency::Daily, 1);
    hy.fred_id = Some("BAMLH0A0HYM2".to_string());
    let mut vix = DatasetDescriptor::new("vix", Frequency::Daily, 0);
    vix.fred_id = Some("VIXCLS".to_string());
    let mut curve = DatasetDescriptor::new("yield_curve_spread", Frequency::Daily, 1);
    curve.fred_id = Some("T10Y2Y".to_string());
    vec![hy, vix, curve]
}

fn default_components() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec::new("credit", "High-yield OAS", "hy_oas", true, 0.4).with_lag_description("daily, T+1"),
        ComponentSpec::new("volatility", "VIX", "vix", true, 0.35).with_lag_description("daily close"),
        ComponentSpec::new("curve", "10y-2y curve", "yield_curve_spread", false, 0.25).with_lag_description("daily, T+1"),
    ]
}

fn default_triggers() -> Vec<TriggerDefinition> {
    vec![
        TriggerDefinition::new(
            "vix_spike",
            "VIX above 25",
            TriggerCondition::above("vix", Threshold::Named("vix_high".to_string())),
        ),
        TriggerDefinition::new(
            "credit_complacency",
            "HY spreads in bottom quintile",
            TriggerCondition::below(
                format!("hy_oas{PERCENTILE_SUFFIX}"),
                Threshold::Named("hy_pctl_tight".to_string()),
            ),
        ),
        TriggerDefinition::new(
            "credit_widening",
            "HY spreads widening with inverted curve",
            TriggerCondition::All {
                conditions: vec![
                    TriggerCondition::above("hy_oas_chg_20d", Threshold::Named("hy_widening".to_string())),
                    TriggerCondition::below("yield_curve_spread", Threshold::Fixed(0.0)),
                ],
            },
        ),
    ]
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| AppError::new(2, format!("Failed to parse config '{}': {e}", path.display())))?;
        config.validate()?;

        info!(
            path = %path.display(),
            version = %config.version,
            datasets = config.datasets.len(),
            components = config.components.len(),
            triggers = config.triggers.len(),
            "engine config loaded"
        );
        Ok(config)
    }

    /// Write the config as pretty JSON (temp file, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::new(2, format!("Failed to serialize config: {e}")))?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", tmp_path.display())))?;
        std::fs::rename(&tmp_path, path)
            .map_err(|e| AppError::new(2, format!("Failed to rename to '{}': {e}", path.display())))?;
        info!(path = %path.display(), "engine config saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SignalError> {
        let invalid = |msg: String| -> Result<(), SignalError> { Err(SignalError::InvalidConfig(msg)) };

        if self.anchor_series.trim().is_empty() {
            return invalid("anchor_series must be set".to_string());
        }
        if self.percentile_min_window == 0 {
            return invalid("percentile_min_window must be >= 1".to_string());
        }
        for w in &self.correlation_windows {
            if w.days == 0 {
                return invalid(format!("correlation window `{}` has zero length", w.label));
            }
        }

        // Percentile columns are keyed `<id>_pctl`; a series may not claim that name.
        let mut ids = HashSet::new();
        let series_ids = self.datasets.iter().map(|d| &d.id).chain(self.derived.iter().map(|d| &d.id));
        for id in series_ids {
            if !ids.insert(id.as_str()) {
                return invalid(format!("duplicate series id `{id}`"));
            }
            if id.ends_with(PERCENTILE_SUFFIX) {
                return invalid(format!("series id `{id}` uses the reserved `{PERCENTILE_SUFFIX}` suffix"));
            }
        }
        if let Some(d) = self.datasets.iter().find(|d| d.publication_lag_days < 0) {
            return invalid(format!("dataset `{}` has a negative publication lag", d.id));
        }

        let mut component_ids = HashSet::new();
        for c in &self.components {
            if !component_ids.insert(c.id.as_str()) {
                return invalid(format!("duplicate component id `{}`", c.id));
            }
            if !(c.weight.is_finite() && c.weight > 0.0) {
                return invalid(format!("component `{}` must have a positive weight", c.id));
            }
        }

        let mut trigger_ids = HashSet::new();
        for t in &self.triggers {
            if !trigger_ids.insert(t.id.as_str()) {
                return invalid(format!("duplicate trigger id `{}`", t.id));
            }
        }

        if let Some(outcome) = &self.outcome {
            if outcome.horizon_days == 0 {
                return invalid("outcome horizon_days must be >= 1".to_string());
            }
        }
        Ok(())
    }
}
