//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the calendar, alignment, statistics and scoring layers
//! - exported to JSON as part of the final response
//! - reloaded from configuration files

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a named series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Native observation frequency of a source series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Irregular,
}

/// Static metadata for one named series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub id: String,
    /// Informational: logged on ingest and carried in config. Alignment is
    /// driven by observation dates and the publication lag, not by this field.
    pub frequency: Frequency,
    /// Days between an observation's reference date and when it became knowable.
    #[serde(default)]
    pub publication_lag_days: i64,
    /// Earliest reliable observation; anything before it is discarded on ingest.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Upstream FRED series id, used only by the fetch collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fred_id: Option<String>,
}

impl DatasetDescriptor {
    pub fn new(id: impl Into<String>, frequency: Frequency, publication_lag_days: i64) -> Self {
        Self {
            id: id.into(),
            frequency,
            publication_lag_days,
            start_date: None,
            fred_id: None,
        }
    }
}

/// Spacing of the common time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Every calendar date.
    Daily,
    /// Monday through Friday (no holiday calendar).
    BusinessDay,
    /// Every Friday.
    Weekly,
}

/// A series mapped onto a grid: `None` where nothing was knowable yet.
pub type AlignedSeries = Vec<Option<f64>>;

/// Named aligned columns sharing one grid. Ordered so pair enumeration is stable.
pub type AlignedSet = BTreeMap<String, AlignedSeries>;

/// Which correlation coefficient to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

/// Correlation of one unordered pair over one trailing window.
///
/// Both coefficients are `None` when fewer than the minimum number of valid
/// paired observations exist in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub series_a: String,
    pub series_b: String,
    pub pearson: Option<f64>,
    pub spearman: Option<f64>,
    /// Number of valid (non-null on both sides) pairs in the window.
    pub observations: usize,
}

/// All pairwise correlations for one trailing window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingCorrelationWindow {
    pub as_of: NaiveDate,
    pub window_label: String,
    pub window_days: usize,
    pub pairs: Vec<CorrelationPair>,
}

/// Historical event-study statistics for one trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerStat {
    pub trigger_id: String,
    pub trigger_name: String,
    pub horizon_days: usize,
    pub triggered_count: usize,
    pub outcome_count: usize,
    pub base_rate: f64,
    pub conditional_rate: f64,
    pub lift: f64,
    pub ci95: [f64; 2],
}

/// Categorical regime label derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeLabel {
    #[serde(rename = "Risk-On")]
    RiskOn,
    Neutral,
    #[serde(rename = "Risk-Off")]
    RiskOff,
    Stress,
}

impl RegimeLabel {
    /// Map a composite score onto its label.
    ///
    /// Thresholds are inclusive lower bounds: 75 → Stress, 55 → Risk-Off, 40 → Neutral.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RegimeLabel::Stress
        } else if score >= 55.0 {
            RegimeLabel::RiskOff
        } else if score >= 40.0 {
            RegimeLabel::Neutral
        } else {
            RegimeLabel::RiskOn
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RegimeLabel::RiskOn => "Risk-On",
            RegimeLabel::Neutral => "Neutral",
            RegimeLabel::RiskOff => "Risk-Off",
            RegimeLabel::Stress => "Stress",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One scored component of the composite regime score.
///
/// Numeric fields are `None` when the component had no usable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeComponentScore {
    pub id: String,
    pub name: String,
    pub raw_value: Option<f64>,
    pub percentile: Option<f64>,
    /// Directional stress on a 0..100 scale (percentile flipped when lower is bad).
    pub stress_score: Option<f64>,
    pub contribution: f64,
    pub as_of: Option<NaiveDate>,
    pub weight: f64,
    pub lag_description: String,
}

/// The composite regime score at one `as_of` date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeScore {
    pub as_of: NaiveDate,
    pub score: f64,
    pub label: RegimeLabel,
    pub components: Vec<RegimeComponentScore>,
    pub top_drivers: Vec<String>,
    pub active_alerts: Vec<String>,
    pub warnings: Vec<String>,
}

/// Inclusive date range covered by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Run metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub computed_at: DateTime<Utc>,
    pub version: String,
    pub data_range: DataRange,
    pub grid_points: usize,
    pub series_count: usize,
}

/// Final response of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSignalsResponse {
    pub as_of: NaiveDate,
    pub regime: RegimeScore,
    pub correlations: Vec<RollingCorrelationWindow>,
    pub trigger_stats: Vec<TriggerStat>,
    pub metadata: RunMetadata,
}
