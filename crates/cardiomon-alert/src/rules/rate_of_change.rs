use crate::window::MetricFamily;
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::types::{Alert, MetricType, Reading};

#[derive(Debug, Clone, PartialEq)]
pub struct RapidDrop {
    pub timestamp: i64,
    pub percent: f64,
}

/// Percentage drop between each adjacent pair, reported at the later
/// reading when it reaches `min_percent`. Pairs whose earlier value is not
/// positive are skipped.
pub fn drops(readings: &[&Reading], min_percent: f64) -> Vec<RapidDrop> {
    readings
        .windows(2)
        .filter_map(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            if prev.value <= 0.0 {
                return None;
            }
            let percent = 100.0 * (prev.value - cur.value) / prev.value;
            (percent.is_finite() && percent >= min_percent).then_some(RapidDrop {
                timestamp: cur.timestamp,
                percent,
            })
        })
        .collect()
}

pub struct RapidDropRule {
    pub id: String,
    pub min_percent: f64,
}

impl RapidDropRule {
    pub fn new(id: &str, min_percent: f64) -> Self {
        Self {
            id: id.to_string(),
            min_percent,
        }
    }
}

impl RuleEvaluator for RapidDropRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn family(&self) -> MetricFamily {
        MetricFamily::Saturation
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Alert> {
        let readings = ctx.window.of(MetricType::Saturation);
        drops(&readings, self.min_percent)
            .iter()
            .map(|d| {
                tracing::debug!(
                    patient_id = ctx.patient_id,
                    timestamp = d.timestamp,
                    drop_percent = d.percent,
                    "Saturation rapid drop"
                );
                Alert::new(ctx.patient_id, "Saturation Rapid Drop Alert", d.timestamp)
            })
            .collect()
    }
}
