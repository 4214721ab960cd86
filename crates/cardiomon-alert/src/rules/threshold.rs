use crate::window::MetricFamily;
use crate::{EvaluationContext, RuleEvaluator};
use cardiomon_common::types::{Alert, MetricType, Reading};

/// Which side of the band a reading fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Above,
    Below,
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

/// Safe band; a missing side is unbounded. Comparisons are strict, so a
/// reading exactly on a limit is in band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Band {
    pub fn between(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn at_least(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Breach {
    pub timestamp: i64,
    pub value: f64,
    pub bound: Bound,
    pub limit: f64,
}

/// One breach per out-of-band reading, in input order.
pub fn breaches(readings: &[&Reading], band: Band) -> Vec<Breach> {
    readings
        .iter()
        .filter_map(|r| {
            if let Some(upper) = band.upper.filter(|upper| r.value > *upper) {
                return Some(Breach {
                    timestamp: r.timestamp,
                    value: r.value,
                    bound: Bound::Above,
                    limit: upper,
                });
            }
            band.lower
                .filter(|lower| r.value < *lower)
                .map(|lower| Breach {
                    timestamp: r.timestamp,
                    value: r.value,
                    bound: Bound::Below,
                    limit: lower,
                })
        })
        .collect()
}

/// How a breach is worded in the alert condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wording {
    /// `"<metric> has exceeded <limit><unit>"` or `"<metric> has dropped below <limit><unit>"`.
    Bound { unit: &'static str },
    /// The same text for every breach.
    Fixed(&'static str),
}

pub struct ThresholdRule {
    pub id: String,
    pub metric: MetricType,
    pub family: MetricFamily,
    pub band: Band,
    pub wording: Wording,
}

impl ThresholdRule {
    pub fn blood_pressure(id: &str, metric: MetricType, lower: f64, upper: f64) -> Self {
        Self {
            id: id.to_string(),
            metric,
            family: MetricFamily::BloodPressure,
            band: Band::between(lower, upper),
            wording: Wording::Bound { unit: " mmHg" },
        }
    }

    pub fn low_saturation(id: &str, lower: f64) -> Self {
        Self {
            id: id.to_string(),
            metric: MetricType::Saturation,
            family: MetricFamily::Saturation,
            band: Band::at_least(lower),
            wording: Wording::Fixed("Low Saturation Alert"),
        }
    }

    pub fn heart_rate(id: &str, metric: MetricType, lower: f64, upper: f64) -> Self {
        Self {
            id: id.to_string(),
            metric,
            family: MetricFamily::Cardiac,
            band: Band::between(lower, upper),
            wording: Wording::Fixed("Critical Heart Rate Alert"),
        }
    }

    fn condition(&self, breach: &Breach) -> String {
        let unit = match self.wording {
            Wording::Fixed(text) => return text.to_string(),
            Wording::Bound { unit } => unit,
        };
        let verb = match breach.bound {
            Bound::Above => "has exceeded",
            Bound::Below => "has dropped below",
        };
        format!(
            "{} {} {}{}",
            self.metric.display_name(),
            verb,
            breach.limit,
            unit
        )
    }
}

impl RuleEvaluator for ThresholdRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn family(&self) -> MetricFamily {
        self.family
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Alert> {
        let readings = ctx.window.of(self.metric);
        breaches(&readings, self.band)
            .iter()
            .map(|b| Alert::new(ctx.patient_id, self.condition(b), b.timestamp))
            .collect()
    }
}
