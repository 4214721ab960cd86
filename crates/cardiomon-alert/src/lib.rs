//! Alert evaluation engine for patient vital signs.
//!
//! The engine fetches a lookback window of readings per metric family
//! through the [`window::WindowSelector`] and evaluates it with the
//! registered [`RuleEvaluator`] implementations. Built-in rule types include
//! threshold bands, monotonic trends, rapid saturation drops, the
//! hypotensive hypoxemia composite and sliding-window ECG anomalies.

pub mod config;
pub mod engine;
pub mod rules;
pub mod state;
pub mod window;

#[cfg(test)]
mod tests;

use cardiomon_common::types::{Alert, PatientId};
use state::TrendStates;
use window::{FamilyWindow, MetricFamily};

pub use config::{AlertConfig, ConfigError, TrendMode};
pub use engine::AlertEngine;

/// Everything a rule can see during one evaluation pass for one patient.
pub struct EvaluationContext<'a> {
    pub patient_id: PatientId,
    /// Evaluation time in epoch milliseconds; also the end of `window`.
    pub now: i64,
    pub window: &'a FamilyWindow,
    /// Cross-pass accumulators owned by the engine, keyed by patient and metric.
    pub trend_states: &'a TrendStates,
}

/// An alert rule that evaluates the readings of one metric family and
/// produces zero or more [`Alert`]s.
///
/// Implementations are registered in the [`engine::AlertEngine`] and run
/// once per pass for every patient whose window for [`family`](Self::family)
/// is non-empty. Rules are total over their input: an empty or unexpected
/// sequence yields no alerts rather than an error.
pub trait RuleEvaluator: Send + Sync {
    /// Unique identifier for this rule instance (e.g., `"systolic-threshold"`).
    fn id(&self) -> &str;

    /// The metric family whose window this rule consumes.
    fn family(&self) -> MetricFamily;

    /// Evaluates the family window and returns alerts in emission order.
    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Alert>;
}
