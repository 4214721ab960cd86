//! Built-in rule evaluators, one module per alert family.

pub mod composite;
pub mod ecg_anomaly;
pub mod rate_of_change;
pub mod threshold;
pub mod trend;

use crate::config::AlertConfig;
use crate::RuleEvaluator;
use cardiomon_common::types::MetricType;
use composite::HypotensiveHypoxemiaRule;
use ecg_anomaly::EcgAnomalyRule;
use rate_of_change::RapidDropRule;
use threshold::ThresholdRule;
use trend::TrendRule;

/// The standard clinical rule set, in per-family emission order.
pub fn default_rules(config: &AlertConfig) -> Vec<Box<dyn RuleEvaluator>> {
    vec![
        Box::new(TrendRule::new(
            "systolic-trend",
            MetricType::SystolicPressure,
            config.trend_min_delta,
            config.trend_mode,
        )),
        Box::new(TrendRule::new(
            "diastolic-trend",
            MetricType::DiastolicPressure,
            config.trend_min_delta,
            config.trend_mode,
        )),
        Box::new(ThresholdRule::blood_pressure(
            "systolic-threshold",
            MetricType::SystolicPressure,
            90.0,
            180.0,
        )),
        Box::new(ThresholdRule::blood_pressure(
            "diastolic-threshold",
            MetricType::DiastolicPressure,
            60.0,
            120.0,
        )),
        Box::new(ThresholdRule::low_saturation("low-saturation", 92.0)),
        Box::new(RapidDropRule::new("saturation-rapid-drop", config.rapid_drop_percent)),
        Box::new(HypotensiveHypoxemiaRule::new("hypotensive-hypoxemia", 90.0, 92.0)),
        Box::new(ThresholdRule::heart_rate(
            "heart-rate-threshold",
            MetricType::HeartRate,
            50.0,
            100.0,
        )),
        Box::new(ThresholdRule::heart_rate(
            "ecg-rate-threshold",
            MetricType::Ecg,
            50.0,
            100.0,
        )),
        Box::new(EcgAnomalyRule::new(
            "ecg-anomaly",
            config.ecg_window_size,
            config.ecg_multiplier,
        )),
    ]
}
