//! Formatted terminal output for a regime run.
//!
//! Formatting lives here so the engine stays free of presentation concerns.

use crate::domain::{RegimeComponentScore, RegimeSignalsResponse};
use crate::report::{rank_pairs_by_strength, rank_triggers_by_lift};

/// Headline score, components, drivers, alerts and warnings.
pub fn format_run_summary(response: &RegimeSignalsResponse) -> String {
    let regime = &response.regime;
    let meta = &response.metadata;
    let mut out = String::new();

    out.push_str("=== regime - Market Regime Signals ===\n");
    out.push_str(&format!("As-of: {}\n", response.as_of));
    out.push_str(&format!(
        "Data: {} .. {} | grid={} | series={} | {}\n",
        meta.data_range.start, meta.data_range.end, meta.grid_points, meta.series_count, meta.version
    ));
    out.push_str(&format!("\nScore: {:.1} ({})\n", regime.score, regime.label));

    out.push_str("\nComponents:\n");
    out.push_str(&format_components(&regime.components));

    if !regime.top_drivers.is_empty() {
        out.push_str(&format!("\nTop drivers: {}\n", regime.top_drivers.join(", ")));
    }

    out.push_str("\nActive alerts:\n");
    if regime.active_alerts.is_empty() {
        out.push_str("  (none)\n");
    }
    for alert in &regime.active_alerts {
        out.push_str(&format!("  ! {alert}\n"));
    }

    if !regime.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &regime.warnings {
            out.push_str(&format!("  - {w}\n"));
        }
    }

    out
}

fn format_components(rows: &[RegimeComponentScore]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<24} {:>10} {:>7} {:>7} {:>6} {:>8} {:<10} {:<16}",
            "component", "value", "pctl", "stress", "weight", "contrib", "as_of", "lag"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<24} {:-<10} {:-<7} {:-<7} {:-<6} {:-<8} {:-<10} {:-<16}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for c in rows {
        out.push_str(
            format!(
                "{:<24} {:>10} {:>7} {:>7} {:>6.2} {:>8.2} {:<10} {:<16}",
                truncate(&c.name, 24),
                fmt_opt(c.raw_value, 3),
                fmt_opt(c.percentile, 1),
                fmt_opt(c.stress_score, 1),
                c.weight,
                c.contribution,
                c.as_of.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                truncate(&c.lag_description, 16),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// One table per correlation window, pairs strongest first.
pub fn format_correlations(response: &RegimeSignalsResponse) -> String {
    let mut out = String::new();
    for window in &response.correlations {
        out.push_str(&format!("Correlations {} (as of {}):\n", window.window_label, window.as_of));
        if window.pairs.is_empty() {
            out.push_str("  (no pairs)\n");
        }
        for p in rank_pairs_by_strength(window) {
            out.push_str(
                format!(
                    "  {:<20} {:<20} spearman={:>7} pearson={:>7} n={}",
                    truncate(&p.series_a, 20),
                    truncate(&p.series_b, 20),
                    fmt_opt(p.spearman, 3),
                    fmt_opt(p.pearson, 3),
                    p.observations
                )
                .trim_end(),
            );
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Trigger event-study table, highest lift first.
pub fn format_trigger_stats(response: &RegimeSignalsResponse) -> String {
    let mut out = String::new();
    let Some(first) = response.trigger_stats.first() else {
        out.push_str("Trigger statistics: (none)\n");
        return out;
    };

    out.push_str(&format!("Trigger statistics (horizon {}d):\n", first.horizon_days));
    out.push_str(
        format!(
            "{:<32} {:>6} {:>6} {:>7} {:>7} {:>6} {:>16}",
            "trigger", "fired", "hits", "base", "cond", "lift", "ci95"
        )
        .trim_end(),
    );
    out.push('\n');
    for s in rank_triggers_by_lift(&response.trigger_stats) {
        out.push_str(
            format!(
                "{:<32} {:>6} {:>6} {:>7.3} {:>7.3} {:>6.2} {:>16}",
                truncate(&s.trigger_name, 32),
                s.triggered_count,
                s.outcome_count,
                s.base_rate,
                s.conditional_rate,
                s.lift,
                format!("[{:.3}, {:.3}]", s.ci95[0], s.ci95[1]),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::data::{ScenarioConfig, generate_scenario};
    use crate::orchestrator::{compute_regime_signals, inputs_from_config};
    use chrono::{TimeZone, Utc};

    fn scenario_response() -> RegimeSignalsResponse {
        let config = EngineConfig::default();
        let scenario = generate_scenario(&ScenarioConfig::default()).unwrap();
        let inputs = inputs_from_config(&config, scenario.series);
        let at = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        compute_regime_signals(&inputs, &config, at).unwrap().into_response()
    }

    #[test]
    fn summary_lists_every_component() {
        let response = scenario_response();
        let text = format_run_summary(&response);
        assert!(text.contains(&format!("Score: {:.1}", response.regime.score)));
        for c in &response.regime.components {
            assert!(text.contains(&truncate(&c.name, 24)));
        }
    }

    #[test]
    fn tables_cover_windows_and_triggers() {
        let response = scenario_response();
        let corr = format_correlations(&response);
        assert!(corr.contains("Correlations 60d"));
        assert!(corr.contains("Correlations 126d"));
        let trig = format_trigger_stats(&response);
        assert!(trig.contains("horizon 20d"));
        assert_eq!(trig.lines().count(), 2 + response.trigger_stats.len());
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("credit", 10), "credit");
        assert_eq!(truncate("high-yield spreads", 6), "high-.");
    }
}
