use crate::window::MetricFamily;
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::types::{Alert, MetricType, Reading};

#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub timestamp: i64,
    pub value: f64,
    pub baseline: f64,
}

/// Compares each point with the mean of the `window_size` points before it
/// and reports it when it exceeds `baseline * multiplier`.
pub fn anomalies(readings: &[&Reading], window_size: usize, multiplier: f64) -> Vec<Anomaly> {
    if window_size == 0 {
        return Vec::new();
    }

    readings
        .windows(window_size + 1)
        .filter_map(|w| {
            let (base, next) = w.split_at(window_size);
            let next = next[0];
            let baseline = base.iter().map(|r| r.value).sum::<f64>() / window_size as f64;
            (next.value > baseline * multiplier).then_some(Anomaly {
                timestamp: next.timestamp,
                value: next.value,
                baseline,
            })
        })
        .collect()
}

pub struct EcgAnomalyRule {
    pub id: String,
    pub window_size: usize,
    pub multiplier: f64,
}

impl EcgAnomalyRule {
    pub fn new(id: &str, window_size: usize, multiplier: f64) -> Self {
        Self {
            id: id.to_string(),
            window_size,
            multiplier,
        }
    }
}

impl RuleEvaluator for EcgAnomalyRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn family(&self) -> MetricFamily {
        MetricFamily::Cardiac
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Alert> {
        let readings = ctx.window.of(MetricType::Ecg);
        anomalies(&readings, self.window_size, self.multiplier)
            .iter()
            .map(|a| Alert::new(ctx.patient_id, "ECG Abnormal Data Alert", a.timestamp))
            .collect()
    }
}
