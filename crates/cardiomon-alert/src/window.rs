use crate::config::AlertConfig;
use cardiomon_common::types::{MetricType, PatientId, Reading};
use cardiomon_storage::RecordStore;
use std::sync::Arc;
use std::time::Duration;

/// A group of metrics evaluated together over one lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    BloodPressure,
    Saturation,
    HypotensiveHypoxemia,
    Cardiac,
}

impl MetricFamily {
    /// Evaluation order used by the engine.
    pub const ALL: [MetricFamily; 4] = [
        MetricFamily::BloodPressure,
        MetricFamily::Saturation,
        MetricFamily::HypotensiveHypoxemia,
        MetricFamily::Cardiac,
    ];

    pub fn metrics(&self) -> &'static [MetricType] {
        match self {
            MetricFamily::BloodPressure => {
                &[MetricType::SystolicPressure, MetricType::DiastolicPressure]
            }
            MetricFamily::Saturation => &[MetricType::Saturation],
            MetricFamily::HypotensiveHypoxemia => {
                &[MetricType::SystolicPressure, MetricType::Saturation]
            }
            MetricFamily::Cardiac => &[MetricType::Ecg, MetricType::HeartRate],
        }
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricFamily::BloodPressure => write!(f, "blood_pressure"),
            MetricFamily::Saturation => write!(f, "saturation"),
            MetricFamily::HypotensiveHypoxemia => write!(f, "hypotensive_hypoxemia"),
            MetricFamily::Cardiac => write!(f, "cardiac"),
        }
    }
}

/// Closed interval `[start, end]` in epoch milliseconds.
///
/// Only constructible from an end point and an unsigned lookback, so
/// `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    pub fn ending_at(end: i64, lookback: Duration) -> Self {
        let span = i64::try_from(lookback.as_millis()).unwrap_or(i64::MAX);
        Self {
            start: end.saturating_sub(span),
            end,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// The readings of one metric family inside its lookback window.
#[derive(Debug, Clone)]
pub struct FamilyWindow {
    family: MetricFamily,
    window: TimeWindow,
    readings: Vec<Reading>,
}

impl FamilyWindow {
    pub fn new(family: MetricFamily, window: TimeWindow, readings: Vec<Reading>) -> Self {
        Self {
            family,
            window,
            readings,
        }
    }

    pub fn family(&self) -> MetricFamily {
        self.family
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Readings of exactly `metric`, in store order.
    pub fn of(&self, metric: MetricType) -> Vec<&Reading> {
        self.readings
            .iter()
            .filter(|r| r.metric_type == metric)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Maps a metric family to its lookback and fetches the matching readings.
pub struct WindowSelector {
    store: Arc<dyn RecordStore>,
    config: AlertConfig,
}

impl WindowSelector {
    pub fn new(store: Arc<dyn RecordStore>, config: AlertConfig) -> Self {
        Self { store, config }
    }

    pub fn lookback(&self, family: MetricFamily) -> Duration {
        self.config.lookback(family)
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Returns `None` when the patient has no readings of the family's
    /// metrics inside the window.
    pub fn select(&self, patient_id: PatientId, now: i64, family: MetricFamily) -> Option<FamilyWindow> {
        let window = TimeWindow::ending_at(now, self.lookback(family));
        let wanted = family.metrics();
        let readings: Vec<Reading> = self
            .store
            .get_records(patient_id, window.start(), window.end())
            .into_iter()
            .filter(|r| wanted.contains(&r.metric_type) && window.contains(r.timestamp))
            .collect();

        if readings.is_empty() {
            return None;
        }
        Some(FamilyWindow::new(family, window, readings))
    }
}
