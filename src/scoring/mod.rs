//! Composite regime scoring.
//!
//! Each component turns its latest expanding percentile into a directional
//! stress score (`percentile` when higher is bad, `100 - percentile` otherwise),
//! weights it, and the composite is the weighted mean over components that
//! actually had data:
//!
//! ```text
//! score = Σ stress_i * w_i / Σ w_i   (i over components with a percentile)
//! ```
//!
//! rounded to one decimal and clamped to `[0, 100]`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{RegimeComponentScore, RegimeLabel, RegimeScore};

/// Extra days of tolerance beyond a component's publication lag before it is stale.
pub const STALENESS_GRACE_DAYS: i64 = 3;

/// Number of drivers surfaced in `RegimeScore::top_drivers`.
pub const TOP_DRIVERS: usize = 3;

/// Score used when no component has data.
pub const NO_DATA_SCORE: f64 = 50.0;

/// Static declaration of one scored component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    pub name: String,
    /// Aligned (primary or derived) series whose value and percentile are scored.
    pub series: String,
    pub higher_is_bad: bool,
    pub weight: f64,
    #[serde(default)]
    pub lag_description: String,
}

impl ComponentSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, series: impl Into<String>, higher_is_bad: bool, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            series: series.into(),
            higher_is_bad,
            weight,
            lag_description: String::new(),
        }
    }

    pub fn with_lag_description(mut self, description: impl Into<String>) -> Self {
        self.lag_description = description.into();
        self
    }

    /// Directional stress on 0..100.
    pub fn stress_score(&self, percentile: f64) -> f64 {
        let p = percentile.clamp(0.0, 100.0);
        if self.higher_is_bad { p } else { 100.0 - p }
    }
}

/// Latest observed state of one component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentReading {
    pub raw_value: Option<f64>,
    pub percentile: Option<f64>,
    /// Reference date of the source observation behind `raw_value`.
    pub as_of: Option<NaiveDate>,
    /// Declared publication lag of the source dataset, for the staleness check.
    pub publication_lag_days: i64,
}

/// Score all components at `as_of` and assemble the regime snapshot.
pub fn compute_regime_score(
    as_of: NaiveDate,
    components: &[(ComponentSpec, ComponentReading)],
    active_alerts: Vec<String>,
) -> RegimeScore {
    let mut scored = Vec::with_capacity(components.len());
    let mut warnings = Vec::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (spec, reading) in components {
        let Some(percentile) = reading.percentile.filter(|p| p.is_finite()) else {
            warnings.push(format!("{}: data unavailable", spec.name));
            scored.push(RegimeComponentScore {
                id: spec.id.clone(),
                name: spec.name.clone(),
                raw_value: None,
                percentile: None,
                stress_score: None,
                contribution: 0.0,
                as_of: None,
                weight: spec.weight,
                lag_description: spec.lag_description.clone(),
            });
            continue;
        };

        if let Some(observed) = reading.as_of {
            let age = (as_of - observed).num_days();
            let limit = reading.publication_lag_days.max(0) + STALENESS_GRACE_DAYS;
            if age > limit {
                warnings.push(format!(
                    "{}: last observation {observed} is {age} days old (expected within {limit})",
                    spec.name
                ));
            }
        }

        let stress = spec.stress_score(percentile);
        let contribution = stress * spec.weight;
        weighted_sum += contribution;
        weight_total += spec.weight;

        scored.push(RegimeComponentScore {
            id: spec.id.clone(),
            name: spec.name.clone(),
            raw_value: reading.raw_value,
            percentile: Some(percentile),
            stress_score: Some(stress),
            contribution,
            as_of: reading.as_of,
            weight: spec.weight,
            lag_description: spec.lag_description.clone(),
        });
    }

    let score = if weight_total > 0.0 {
        round_score(weighted_sum / weight_total)
    } else {
        warnings.push("no component data available; score defaults to neutral".to_string());
        NO_DATA_SCORE
    };

    RegimeScore {
        as_of,
        score,
        label: RegimeLabel::from_score(score),
        top_drivers: top_drivers(&scored),
        components: scored,
        active_alerts,
        warnings,
    }
}

/// Round to one decimal and clamp to `[0, 100]`.
pub fn round_score(raw: f64) -> f64 {
    if !raw.is_finite() {
        return NO_DATA_SCORE;
    }
    ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Names of the components with the largest positive contributions.
fn top_drivers(components: &[RegimeComponentScore]) -> Vec<String> {
    let mut positive: Vec<&RegimeComponentScore> = components.iter().filter(|c| c.contribution > 0.0).collect();
    positive.sort_by(|a, b| b.contribution.partial_cmp(&a.contribution).unwrap_or(std::cmp::Ordering::Equal));
    positive.into_iter().take(TOP_DRIVERS).map(|c| c.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reading(value: f64, percentile: f64, as_of: NaiveDate) -> ComponentReading {
        ComponentReading {
            raw_value: Some(value),
            percentile: Some(percentile),
            as_of: Some(as_of),
            publication_lag_days: 0,
        }
    }

    #[test]
    fn weighted_mean_with_direction() {
        let today = d(2024, 6, 14);
        let components = vec![
            (ComponentSpec::new("credit", "Credit spreads", "hy_oas", true, 2.0), reading(4.5, 90.0, today)),
            (ComponentSpec::new("curve", "Yield curve", "t10y2y", false, 1.0), reading(-0.3, 10.0, today)),
        ];
        let s = compute_regime_score(today, &components, vec![]);
        // (90 * 2 + 90 * 1) / 3
        assert_eq!(s.score, 90.0);
        assert_eq!(s.label, RegimeLabel::Stress);
        assert_eq!(s.components[1].stress_score, Some(90.0));
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn missing_component_is_listed_and_excluded_from_weights() {
        let today = d(2024, 6, 14);
        let components = vec![
            (ComponentSpec::new("credit", "Credit spreads", "hy_oas", true, 1.0), reading(4.5, 40.0, today)),
            (ComponentSpec::new("vol", "Volatility", "vix", true, 3.0), ComponentReading::default()),
        ];
        let s = compute_regime_score(today, &components, vec![]);
        assert_eq!(s.score, 40.0);
        assert_eq!(s.label, RegimeLabel::Neutral);
        assert_eq!(s.components.len(), 2);
        assert_eq!(s.components[1].percentile, None);
        assert_eq!(s.components[1].contribution, 0.0);
        assert!(s.warnings.iter().any(|w| w.contains("Volatility") && w.contains("unavailable")));
    }

    #[test]
    fn no_data_defaults_to_neutral_with_warning() {
        let s = compute_regime_score(
            d(2024, 6, 14),
            &[(ComponentSpec::new("vol", "Volatility", "vix", true, 1.0), ComponentReading::default())],
            vec![],
        );
        assert_eq!(s.score, NO_DATA_SCORE);
        assert!(s.warnings.len() >= 2);
    }

    #[test]
    fn rounding_feeds_label_boundaries() {
        assert_eq!(round_score(74.96), 75.0);
        assert_eq!(RegimeLabel::from_score(round_score(74.94)), RegimeLabel::RiskOff);
        assert_eq!(round_score(-3.0), 0.0);
        assert_eq!(round_score(120.0), 100.0);
    }

    #[test]
    fn staleness_uses_publication_lag_plus_grace() {
        let today = d(2024, 6, 14);
        let spec = ComponentSpec::new("claims", "Jobless claims", "claims", true, 1.0).with_lag_description("weekly, ~5d");
        let lagged = |as_of| ComponentReading {
            publication_lag_days: 5,
            ..reading(220.0, 50.0, as_of)
        };
        let fresh = compute_regime_score(today, &[(spec.clone(), lagged(d(2024, 6, 6)))], vec![]);
        assert!(fresh.warnings.is_empty()); // 8 days == 5 + 3
        let stale = compute_regime_score(today, &[(spec, lagged(d(2024, 6, 5)))], vec![]);
        assert_eq!(stale.warnings.len(), 1);
        assert!(stale.warnings[0].contains("9 days"));
    }

    #[test]
    fn top_drivers_are_largest_positive_contributions() {
        let today = d(2024, 6, 14);
        let components = vec![
            (ComponentSpec::new("a", "A", "a", true, 1.0), reading(1.0, 10.0, today)),
            (ComponentSpec::new("b", "B", "b", true, 1.0), reading(1.0, 80.0, today)),
            (ComponentSpec::new("c", "C", "c", true, 1.0), reading(1.0, 0.0, today)),
            (ComponentSpec::new("d", "D", "d", true, 1.0), reading(1.0, 60.0, today)),
            (ComponentSpec::new("e", "E", "e", true, 1.0), reading(1.0, 70.0, today)),
        ];
        let s = compute_regime_score(today, &components, vec!["VIX above 25".into()]);
        assert_eq!(s.top_drivers, vec!["B", "E", "D"]);
        assert_eq!(s.active_alerts, vec!["VIX above 25"]);
    }

    #[test]
    fn score_is_always_bounded() {
        let mut rng = StdRng::seed_from_u64(5);
        let today = d(2024, 6, 14);
        for _ in 0..200 {
            let n = rng.gen_range(1..8);
            let components: Vec<_> = (0..n)
                .map(|i| {
                    let spec = ComponentSpec::new(format!("c{i}"), format!("C{i}"), "x", rng.gen_bool(0.5), rng.gen_range(0.01..5.0));
                    let pct = if rng.gen_bool(0.2) { None } else { Some(rng.gen_range(-20.0..130.0)) };
                    (spec, ComponentReading { raw_value: Some(1.0), percentile: pct, as_of: Some(today), publication_lag_days: 0 })
                })
                .collect();
            let s = compute_regime_score(today, &components, vec![]);
            assert!((0.0..=100.0).contains(&s.score), "score {}", s.score);
            assert_eq!(s.label, RegimeLabel::from_score(s.score));
        }
    }
}
