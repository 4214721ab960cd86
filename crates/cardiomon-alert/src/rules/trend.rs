use crate::config::TrendMode;
use crate::window::MetricFamily;
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::types::{Alert, MetricType, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increasing => write!(f, "Increasing"),
            Self::Decreasing => write!(f, "Decreasing"),
        }
    }
}

/// Classifies the whole sequence: increasing iff every adjacent step rises
/// by more than `min_delta`, decreasing iff every step falls by more than
/// `min_delta`. Sequences shorter than three readings never qualify.
pub fn detect(readings: &[&Reading], min_delta: f64) -> Vec<TrendDirection> {
    if readings.len() < 3 {
        return Vec::new();
    }

    let increasing = readings
        .windows(2)
        .all(|pair| pair[1].value - pair[0].value > min_delta);
    let decreasing = readings
        .windows(2)
        .all(|pair| pair[0].value - pair[1].value > min_delta);

    let mut found = Vec::new();
    if increasing {
        found.push(TrendDirection::Increasing);
    }
    if decreasing {
        found.push(TrendDirection::Decreasing);
    }
    found
}

pub struct TrendRule {
    pub id: String,
    pub metric: MetricType,
    pub min_delta: f64,
    pub mode: TrendMode,
}

impl TrendRule {
    pub fn new(id: &str, metric: MetricType, min_delta: f64, mode: TrendMode) -> Self {
        Self {
            id: id.to_string(),
            metric,
            min_delta,
            mode,
        }
    }

    fn condition(&self, direction: TrendDirection) -> String {
        format!("{} {} Trend Alert", self.metric.display_name(), direction)
    }
}

impl RuleEvaluator for TrendRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn family(&self) -> MetricFamily {
        MetricFamily::BloodPressure
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Alert> {
        let readings = ctx.window.of(self.metric);

        match self.mode {
            TrendMode::Stateless => {
                let Some(last) = readings.last() else {
                    return Vec::new();
                };
                detect(&readings, self.min_delta)
                    .into_iter()
                    .map(|dir| Alert::new(ctx.patient_id, self.condition(dir), last.timestamp))
                    .collect()
            }
            TrendMode::Incremental => ctx
                .trend_states
                .advance(ctx.patient_id, self.metric, &readings, self.min_delta)
                .into_iter()
                .map(|(dir, ts)| Alert::new(ctx.patient_id, self.condition(dir), ts))
                .collect(),
        }
    }
}
