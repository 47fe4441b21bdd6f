//! Trigger definitions and point-in-time evaluation.
//!
//! A trigger is a named, stateless predicate over a snapshot of signal values
//! and a threshold map. Conditions are plain data so trigger sets can be
//! declared in configuration. Every trigger is evaluated independently; no
//! trigger reads another trigger's state.
//!
//! Snapshots are built from aligned (point-in-time) columns only.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::AlignedSet;

/// Named signal values at one grid point. Absent signals are simply missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSnapshot {
    values: HashMap<String, f64>,
}

impl SignalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Snapshot of every column in `set` at grid index `index`.
    pub fn at_index(set: &AlignedSet, index: usize) -> Self {
        let values = set
            .iter()
            .filter_map(|(name, col)| col.get(index).copied().flatten().map(|v| (name.clone(), v)))
            .collect();
        Self { values }
    }
}

/// Named threshold values referenced by trigger conditions.
pub type TriggerThresholds = HashMap<String, f64>;

/// A literal threshold or a key into the threshold map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Fixed(f64),
    Named(String),
}

impl Threshold {
    fn resolve(&self, thresholds: &TriggerThresholds) -> Option<f64> {
        match self {
            Threshold::Fixed(v) => Some(*v),
            Threshold::Named(key) => thresholds.get(key).copied(),
        }
    }
}

/// Boolean condition over a signal snapshot.
///
/// A comparison against a missing signal or an unknown threshold key is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// `signal > threshold`
    Above { signal: String, threshold: Threshold },
    /// `signal < threshold`
    Below { signal: String, threshold: Threshold },
    All { conditions: Vec<TriggerCondition> },
    Any { conditions: Vec<TriggerCondition> },
}

impl TriggerCondition {
    pub fn above(signal: impl Into<String>, threshold: Threshold) -> Self {
        TriggerCondition::Above {
            signal: signal.into(),
            threshold,
        }
    }

    pub fn below(signal: impl Into<String>, threshold: Threshold) -> Self {
        TriggerCondition::Below {
            signal: signal.into(),
            threshold,
        }
    }

    pub fn evaluate(&self, snapshot: &SignalSnapshot, thresholds: &TriggerThresholds) -> bool {
        match self {
            TriggerCondition::Above { signal, threshold } => {
                match (snapshot.get(signal), threshold.resolve(thresholds)) {
                    (Some(v), Some(t)) => v > t,
                    _ => false,
                }
            }
            TriggerCondition::Below { signal, threshold } => {
                match (snapshot.get(signal), threshold.resolve(thresholds)) {
                    (Some(v), Some(t)) => v < t,
                    _ => false,
                }
            }
            TriggerCondition::All { conditions } => {
                !conditions.is_empty() && conditions.iter().all(|c| c.evaluate(snapshot, thresholds))
            }
            TriggerCondition::Any { conditions } => conditions.iter().any(|c| c.evaluate(snapshot, thresholds)),
        }
    }

    /// Signal names this condition reads.
    pub fn signals(&self) -> Vec<&str> {
        match self {
            TriggerCondition::Above { signal, .. } | TriggerCondition::Below { signal, .. } => vec![signal.as_str()],
            TriggerCondition::All { conditions } | TriggerCondition::Any { conditions } => {
                conditions.iter().flat_map(TriggerCondition::signals).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    pub id: String,
    pub name: String,
    pub condition: TriggerCondition,
}

impl TriggerDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, condition: TriggerCondition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition,
        }
    }

    pub fn fires(&self, snapshot: &SignalSnapshot, thresholds: &TriggerThresholds) -> bool {
        self.condition.evaluate(snapshot, thresholds)
    }
}

/// Evaluate every trigger at every grid index of `signals`.
///
/// Returns one boolean column per trigger id, each `len` long.
pub fn evaluate_over_grid(
    triggers: &[TriggerDefinition],
    signals: &AlignedSet,
    thresholds: &TriggerThresholds,
    len: usize,
) -> BTreeMap<String, Vec<bool>> {
    let mut fired: BTreeMap<String, Vec<bool>> =
        triggers.iter().map(|t| (t.id.clone(), Vec::with_capacity(len))).collect();

    for i in 0..len {
        let snapshot = SignalSnapshot::at_index(signals, i);
        for trigger in triggers {
            if let Some(col) = fired.get_mut(&trigger.id) {
                col.push(trigger.fires(&snapshot, thresholds));
            }
        }
    }
    fired
}

/// Triggers firing on the latest snapshot, in declaration order.
pub fn currently_firing<'a>(
    triggers: &'a [TriggerDefinition],
    current: &SignalSnapshot,
    thresholds: &TriggerThresholds,
) -> Vec<&'a TriggerDefinition> {
    triggers.iter().filter(|t| t.fires(current, thresholds)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> TriggerThresholds {
        HashMap::from([("hy_pctl_low".to_string(), 20.0), ("vix_high".to_string(), 25.0)])
    }

    #[test]
    fn comparisons_are_strict() {
        let t = thresholds();
        let c = TriggerCondition::above("vix", Threshold::Named("vix_high".into()));
        assert!(!c.evaluate(&SignalSnapshot::new().with("vix", 25.0), &t));
        assert!(c.evaluate(&SignalSnapshot::new().with("vix", 25.01), &t));

        let below = TriggerCondition::below("hy_oas_pctl", Threshold::Named("hy_pctl_low".into()));
        assert!(below.evaluate(&SignalSnapshot::new().with("hy_oas_pctl", 19.0), &t));
        assert!(!below.evaluate(&SignalSnapshot::new().with("hy_oas_pctl", 20.0), &t));
    }

    #[test]
    fn missing_inputs_do_not_fire() {
        let t = thresholds();
        let missing_signal = TriggerCondition::above("vix", Threshold::Fixed(0.0));
        assert!(!missing_signal.evaluate(&SignalSnapshot::new(), &t));
        let missing_key = TriggerCondition::above("vix", Threshold::Named("nope".into()));
        assert!(!missing_key.evaluate(&SignalSnapshot::new().with("vix", 99.0), &t));
    }

    #[test]
    fn combinators() {
        let t = thresholds();
        let snap = SignalSnapshot::new().with("vix", 30.0).with("facility", 0.0);
        let vix = TriggerCondition::above("vix", Threshold::Named("vix_high".into()));
        let facility = TriggerCondition::above("facility", Threshold::Fixed(0.0));

        let all = TriggerCondition::All { conditions: vec![vix.clone(), facility.clone()] };
        let any = TriggerCondition::Any { conditions: vec![vix, facility] };
        assert!(!all.evaluate(&snap, &t));
        assert!(any.evaluate(&snap, &t));
        assert!(!TriggerCondition::All { conditions: vec![] }.evaluate(&snap, &t));
        assert_eq!(all.signals(), vec!["vix", "facility"]);
    }

    #[test]
    fn condition_round_trips_from_json() {
        let json = r#"{"kind":"all","conditions":[
            {"kind":"above","signal":"vix","threshold":25.0},
            {"kind":"below","signal":"hy_oas_pctl","threshold":"hy_pctl_low"}]}"#;
        let c: TriggerCondition = serde_json::from_str(json).unwrap();
        let snap = SignalSnapshot::new().with("vix", 30.0).with("hy_oas_pctl", 10.0);
        assert!(c.evaluate(&snap, &thresholds()));
    }

    #[test]
    fn grid_evaluation_and_current_firing() {
        let mut set = AlignedSet::new();
        set.insert("vix".into(), vec![Some(20.0), None, Some(30.0)]);
        let triggers = vec![
            TriggerDefinition::new("vix_spike", "VIX above 25", TriggerCondition::above("vix", Threshold::Fixed(25.0))),
            TriggerDefinition::new("vix_calm", "VIX below 15", TriggerCondition::below("vix", Threshold::Fixed(15.0))),
        ];
        let fired = evaluate_over_grid(&triggers, &set, &HashMap::new(), 3);
        assert_eq!(fired["vix_spike"], vec![false, false, true]);
        assert_eq!(fired["vix_calm"], vec![false, false, false]);

        let latest = SignalSnapshot::at_index(&set, 2);
        let firing = currently_firing(&triggers, &latest, &HashMap::new());
        assert_eq!(firing.len(), 1);
        assert_eq!(firing[0].id, "vix_spike");
    }
}
