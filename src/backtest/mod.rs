//! Historical event study for triggers.
//!
//! Unlike every other stage, this module looks forward in time: outcome labels
//! at index `i` are built from outcome observations at `i..i + horizon`. The
//! labels only measure how predictive a trigger was historically. They must
//! never feed the live regime score, which is why this lives apart from
//! `crate::align` and `crate::triggers`.

use serde::{Deserialize, Serialize};

use crate::domain::{AlignedSeries, TriggerStat};
use crate::math::{Z_95, wilson_interval};
use crate::triggers::TriggerDefinition;

/// How an outcome series is turned into a 0/1 indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeRule {
    /// The series already holds 0/1 values.
    Indicator,
    /// 1 when the value is strictly above `level`.
    Above { level: f64 },
    /// 1 when the value is strictly below `level`.
    Below { level: f64 },
}

impl OutcomeRule {
    /// Apply the rule to an aligned column. Nulls stay null.
    pub fn indicator(&self, values: &[Option<f64>]) -> AlignedSeries {
        values
            .iter()
            .map(|v| {
                v.map(|x| {
                    let hit = match self {
                        OutcomeRule::Indicator => x > 0.5,
                        OutcomeRule::Above { level } => x > *level,
                        OutcomeRule::Below { level } => x < *level,
                    };
                    if hit { 1.0 } else { 0.0 }
                })
            })
            .collect()
    }
}

/// Forward outcome label: true at `i` when the indicator equals 1 anywhere in
/// `[i, i + horizon_days)`. The window is truncated at the end of the series.
pub fn compute_forward_outcome(outcome: &[Option<f64>], horizon_days: usize) -> Vec<bool> {
    let n = outcome.len();
    let hit: Vec<bool> = outcome.iter().map(|v| v.is_some_and(|x| x > 0.5)).collect();

    // next_hit[i] = smallest j >= i with hit[j], or n.
    let mut next_hit = vec![n; n + 1];
    for i in (0..n).rev() {
        next_hit[i] = if hit[i] { i } else { next_hit[i + 1] };
    }

    (0..n)
        .map(|i| horizon_days > 0 && next_hit[i] < n && next_hit[i] < i + horizon_days)
        .collect()
}

/// Base rate, conditional rate, lift and Wilson interval for one trigger.
///
/// `fired` and `outcome` are zipped; trailing entries of the longer one are ignored.
pub fn compute_trigger_stat(trigger: &TriggerDefinition, fired: &[bool], outcome: &[bool], horizon_days: usize) -> TriggerStat {
    let n = fired.len().min(outcome.len());
    let mut triggered = 0usize;
    let mut outcomes = 0usize;
    let mut triggered_with_outcome = 0usize;

    for (&f, &o) in fired.iter().zip(outcome).take(n) {
        if f {
            triggered += 1;
        }
        if o {
            outcomes += 1;
        }
        if f && o {
            triggered_with_outcome += 1;
        }
    }

    let base_rate = if n == 0 { 0.0 } else { outcomes as f64 / n as f64 };
    let conditional_rate = if triggered == 0 {
        0.0
    } else {
        triggered_with_outcome as f64 / triggered as f64
    };
    let lift = if base_rate == 0.0 { 0.0 } else { conditional_rate / base_rate };

    TriggerStat {
        trigger_id: trigger.id.clone(),
        trigger_name: trigger.name.clone(),
        horizon_days,
        triggered_count: triggered,
        outcome_count: triggered_with_outcome,
        base_rate,
        conditional_rate,
        lift,
        ci95: wilson_interval(triggered_with_outcome, triggered, Z_95),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::{Threshold, TriggerCondition};

    fn vix_trigger() -> TriggerDefinition {
        TriggerDefinition::new("vix_spike", "VIX above 25", TriggerCondition::above("vix", Threshold::Fixed(25.0)))
    }

    #[test]
    fn forward_outcome_window_is_half_open() {
        let outcome = vec![Some(0.0), Some(0.0), Some(0.0), Some(1.0), Some(0.0)];
        let fwd = compute_forward_outcome(&outcome, 2);
        assert_eq!(fwd, vec![false, false, true, true, false]);
    }

    #[test]
    fn forward_outcome_truncates_and_ignores_nulls() {
        let outcome = vec![None, Some(1.0), None];
        assert_eq!(compute_forward_outcome(&outcome, 5), vec![true, true, false]);
        assert_eq!(compute_forward_outcome(&outcome, 0), vec![false, false, false]);
    }

    #[test]
    fn outcome_rules() {
        let v = vec![Some(10.0), None, Some(40.0)];
        assert_eq!(OutcomeRule::Above { level: 30.0 }.indicator(&v), vec![Some(0.0), None, Some(1.0)]);
        assert_eq!(OutcomeRule::Below { level: 30.0 }.indicator(&v), vec![Some(1.0), None, Some(0.0)]);
        assert_eq!(OutcomeRule::Indicator.indicator(&[Some(1.0), Some(0.0)]), vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn trigger_lift_scenario() {
        // 1000 days; trigger fires on 50, outcome on 200 overall and on 40 of the triggered days.
        let n = 1000;
        let mut signals = crate::domain::AlignedSet::new();
        signals.insert(
            "vix".into(),
            (0..n).map(|i| Some(if i % 20 == 0 { 32.0 } else { 18.0 })).collect(),
        );
        let trigger = vix_trigger();
        let columns = crate::triggers::evaluate_over_grid(
            std::slice::from_ref(&trigger),
            &signals,
            &Default::default(),
            n,
        );
        let fired = &columns["vix_spike"];
        assert_eq!(fired.iter().filter(|f| **f).count(), 50);

        // Outcome on 40 of the 50 triggered days plus 160 untriggered days.
        let mut outcome = vec![false; n];
        for (i, o) in outcome.iter_mut().enumerate() {
            if i % 20 == 0 && i < 800 {
                *o = true;
            }
        }
        let mut extra = 0;
        for (i, o) in outcome.iter_mut().enumerate() {
            if i % 20 != 0 && extra < 160 {
                *o = true;
                extra += 1;
            }
        }
        assert_eq!(outcome.iter().filter(|o| **o).count(), 200);

        let stat = compute_trigger_stat(&trigger, fired, &outcome, 20);
        assert_eq!(stat.triggered_count, 50);
        assert_eq!(stat.outcome_count, 40);
        assert!((stat.base_rate - 0.20).abs() < 1e-12);
        assert!((stat.conditional_rate - 0.80).abs() < 1e-12);
        assert!((stat.lift - 4.0).abs() < 1e-12);
        assert!(stat.ci95[0] < 0.80 && stat.ci95[1] > 0.80);
    }

    #[test]
    fn trigger_lift_from_raw_flags() {
        let n = 1000;
        let mut fired = vec![false; n];
        let mut outcome = vec![false; n];
        for f in fired.iter_mut().take(50) {
            *f = true;
        }
        for o in outcome.iter_mut().take(40) {
            *o = true;
        }
        for o in outcome.iter_mut().skip(100).take(160) {
            *o = true;
        }

        let stat = compute_trigger_stat(&vix_trigger(), &fired, &outcome, 20);
        assert_eq!(stat.triggered_count, 50);
        assert_eq!(stat.outcome_count, 40);
        assert!((stat.base_rate - 0.20).abs() < 1e-12);
        assert!((stat.conditional_rate - 0.80).abs() < 1e-12);
        assert!((stat.lift - 4.0).abs() < 1e-12);
        assert!(stat.ci95[0] < 0.80 && stat.ci95[1] > 0.80);
    }

    #[test]
    fn never_fired_trigger_has_zero_rates() {
        let stat = compute_trigger_stat(&vix_trigger(), &[false; 10], &[true; 10], 20);
        assert_eq!(stat.conditional_rate, 0.0);
        assert_eq!(stat.lift, 0.0);
        assert_eq!(stat.ci95, [0.0, 0.0]);
    }

    #[test]
    fn zero_base_rate_gives_zero_lift() {
        let stat = compute_trigger_stat(&vix_trigger(), &[true; 10], &[false; 10], 20);
        assert_eq!(stat.base_rate, 0.0);
        assert_eq!(stat.lift, 0.0);
    }
}
