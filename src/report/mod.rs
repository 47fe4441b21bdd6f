//! Reporting utilities: rankings over a finished response, and formatted
//! terminal output (`format`).

use crate::domain::{CorrelationPair, RollingCorrelationWindow, TriggerStat};

pub mod format;

pub use format::{format_correlations, format_run_summary, format_trigger_stats};

/// Pairs of one window ranked by absolute Spearman, strongest first.
///
/// Pairs without a coefficient go last, in their original order.
pub fn rank_pairs_by_strength(window: &RollingCorrelationWindow) -> Vec<&CorrelationPair> {
    let mut pairs: Vec<&CorrelationPair> = window.pairs.iter().collect();
    pairs.sort_by(|a, b| {
        let key = |p: &CorrelationPair| p.spearman.map(f64::abs).unwrap_or(-1.0);
        key(b).partial_cmp(&key(a)).unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}

/// Trigger stats ranked by lift, highest first. Triggers that never fired go last.
pub fn rank_triggers_by_lift(stats: &[TriggerStat]) -> Vec<&TriggerStat> {
    let mut ranked: Vec<&TriggerStat> = stats.iter().collect();
    ranked.sort_by(|a, b| {
        let key = |s: &TriggerStat| if s.triggered_count == 0 { -1.0 } else { s.lift };
        key(b).partial_cmp(&key(a)).unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
