use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric patient identifier as assigned by the data source.
pub type PatientId = i32;

/// The kind of vital sign a [`Reading`] measures.
///
/// Labels are matched exactly and case-sensitively, both when parsing
/// ingested lines and when filtering readings for a rule.
///
/// # Examples
///
/// ```
/// use cardiomon_common::types::MetricType;
///
/// let metric: MetricType = "SystolicPressure".parse().unwrap();
/// assert_eq!(metric, MetricType::SystolicPressure);
/// assert_eq!(MetricType::Ecg.to_string(), "ECG");
/// assert!("systolicpressure".parse::<MetricType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricType {
    SystolicPressure,
    DiastolicPressure,
    Saturation,
    #[serde(rename = "ECG")]
    Ecg,
    HeartRate,
}

impl MetricType {
    pub const ALL: [MetricType; 5] = [
        MetricType::SystolicPressure,
        MetricType::DiastolicPressure,
        MetricType::Saturation,
        MetricType::Ecg,
        MetricType::HeartRate,
    ];

    /// The wire label used by data files and streams.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::SystolicPressure => "SystolicPressure",
            MetricType::DiastolicPressure => "DiastolicPressure",
            MetricType::Saturation => "Saturation",
            MetricType::Ecg => "ECG",
            MetricType::HeartRate => "HeartRate",
        }
    }

    /// Human-readable name used in alert conditions.
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricType::SystolicPressure => "Systolic Blood Pressure",
            MetricType::DiastolicPressure => "Diastolic Blood Pressure",
            MetricType::Saturation => "Blood Saturation",
            MetricType::Ecg => "ECG",
            MetricType::HeartRate => "Heart Rate",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown metric type: {s}"))
    }
}

/// A single timestamped vital-sign measurement. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub patient_id: PatientId,
    pub value: f64,
    pub metric_type: MetricType,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Per-patient arrival position, assigned by the store. Timestamps may
    /// arrive out of order or repeat; this never does.
    #[serde(default)]
    pub sequence: u64,
}

impl Reading {
    pub fn new(patient_id: PatientId, value: f64, metric_type: MetricType, timestamp: i64) -> Self {
        Self {
            patient_id,
            value,
            metric_type,
            timestamp,
            sequence: 0,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// An alert raised by a rule evaluator.
///
/// Sinks may decorate the description they deliver, but the alert itself
/// (patient, condition, timestamp) is never rewritten.
///
/// # Examples
///
/// ```
/// use cardiomon_common::types::Alert;
///
/// let alert = Alert::new(7, "Saturation Rapid Drop Alert", 1_700_000_000_000);
/// assert_eq!(alert.patient_id, "7");
/// assert_eq!(alert.timestamp, 1_700_000_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alert {
    pub patient_id: String,
    pub condition: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl Alert {
    pub fn new(patient_id: PatientId, condition: impl Into<String>, timestamp: i64) -> Self {
        let condition = condition.into();
        debug_assert!(!condition.is_empty(), "alert condition must not be empty");
        Self {
            patient_id: patient_id.to_string(),
            condition,
            timestamp,
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Patient ID: {}, Condition: {}, Timestamp: {}",
            self.patient_id, self.condition, self.timestamp
        )
    }
}
