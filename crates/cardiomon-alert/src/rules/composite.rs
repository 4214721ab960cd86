use crate::window::MetricFamily;
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::types::{Alert, MetricType, Reading};

/// True when some systolic reading is below `systolic_below` and some
/// saturation reading is below `saturation_below`.
pub fn holds(
    systolic: &[&Reading],
    saturation: &[&Reading],
    systolic_below: f64,
    saturation_below: f64,
) -> bool {
    systolic.iter().any(|r| r.value < systolic_below)
        && saturation.iter().any(|r| r.value < saturation_below)
}

/// Low systolic pressure together with low saturation in the same short
/// window. Fires at most once per pass, stamped at the evaluation time.
pub struct HypotensiveHypoxemiaRule {
    pub id: String,
    pub systolic_below: f64,
    pub saturation_below: f64,
}

impl HypotensiveHypoxemiaRule {
    pub fn new(id: &str, systolic_below: f64, saturation_below: f64) -> Self {
        Self {
            id: id.to_string(),
            systolic_below,
            saturation_below,
        }
    }
}

impl RuleEvaluator for HypotensiveHypoxemiaRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn family(&self) -> MetricFamily {
        MetricFamily::HypotensiveHypoxemia
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Alert> {
        let systolic = ctx.window.of(MetricType::SystolicPressure);
        let saturation = ctx.window.of(MetricType::Saturation);

        if holds(&systolic, &saturation, self.systolic_below, self.saturation_below) {
            vec![Alert::new(
                ctx.patient_id,
                "Hypotensive Hypoxemia Alert",
                ctx.now,
            )]
        } else {
            Vec::new()
        }
    }
}
