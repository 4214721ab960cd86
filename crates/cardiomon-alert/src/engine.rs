use crate::config::AlertConfig;
use crate::rules::default_rules;
use crate::state::TrendStates;
use crate::window::{MetricFamily, WindowSelector};
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::sink::AlertSink;
use cardiomon_common::types::{Alert, PatientId};
use cardiomon_storage::RecordStore;
use std::sync::Arc;

/// Runs the rule set for a patient and forwards alerts to the sink.
///
/// The engine itself keeps no per-pass state; the only thing carried across
/// calls is the trend accumulator map used by incremental trend rules.
pub struct AlertEngine {
    selector: WindowSelector,
    rules: Vec<Box<dyn RuleEvaluator>>,
    sink: Arc<dyn AlertSink>,
    trend_states: TrendStates,
}

impl AlertEngine {
    pub fn new(
        selector: WindowSelector,
        rules: Vec<Box<dyn RuleEvaluator>>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            selector,
            rules,
            sink,
            trend_states: TrendStates::new(),
        }
    }

    /// Engine with the built-in clinical rule set for `config`.
    pub fn with_default_rules(
        store: Arc<dyn RecordStore>,
        config: AlertConfig,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        let rules = default_rules(&config);
        Self::new(WindowSelector::new(store, config), rules, sink)
    }

    pub fn rules(&self) -> &[Box<dyn RuleEvaluator>] {
        &self.rules
    }

    /// Get a rule by its ID.
    pub fn get_rule(&self, id: &str) -> Option<&dyn RuleEvaluator> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    /// Add a new rule at runtime.
    pub fn add_rule(&mut self, rule: Box<dyn RuleEvaluator>) {
        self.rules.push(rule);
    }

    /// Remove a rule by ID. Returns true if found and removed.
    pub fn remove_rule(&mut self, id: &str) -> bool {
        let len_before = self.rules.len();
        self.rules.retain(|r| r.id() != id);
        self.rules.len() < len_before
    }

    /// Replace all rules with a new set. Trend accumulators are dropped too.
    pub fn replace_rules(&mut self, rules: Vec<Box<dyn RuleEvaluator>>) {
        self.rules = rules;
        self.trend_states.clear();
    }

    pub fn selector(&self) -> &WindowSelector {
        &self.selector
    }

    pub fn trend_states(&self) -> &TrendStates {
        &self.trend_states
    }

    /// Evaluates every family for `patient_id` at `now` (epoch ms).
    ///
    /// Alerts are forwarded to the sink ordered by family, then by each
    /// rule's emission order, and also returned. A family with no readings
    /// in its window is skipped.
    pub fn evaluate(&self, patient_id: PatientId, now: i64) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for family in MetricFamily::ALL {
            let mut rules = self.rules.iter().filter(|r| r.family() == family).peekable();
            if rules.peek().is_none() {
                continue;
            }

            let Some(window) = self.selector.select(patient_id, now, family) else {
                tracing::debug!(patient_id, %family, "No readings in window, skipping");
                continue;
            };

            let ctx = EvaluationContext {
                patient_id,
                now,
                window: &window,
                trend_states: &self.trend_states,
            };

            for rule in rules {
                let produced = rule.evaluate(&ctx);
                if !produced.is_empty() {
                    tracing::debug!(
                        patient_id,
                        rule_id = rule.id(),
                        count = produced.len(),
                        "Rule produced alerts"
                    );
                }
                alerts.extend(produced);
            }
        }

        for alert in &alerts {
            self.sink.accept(alert);
        }
        alerts
    }

    /// Evaluates every patient known to the store.
    pub fn evaluate_all(&self, now: i64) -> Vec<Alert> {
        self.selector
            .store()
            .patient_ids()
            .into_iter()
            .flat_map(|id| self.evaluate(id, now))
            .collect()
    }
}
