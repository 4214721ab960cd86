use cardiomon_common::types::{MetricType, PatientId, Reading};

/// A patient and their append-only reading history.
///
/// Holds domain data only; evaluation bookkeeping such as trend counters is
/// kept by the alert engine, keyed by patient and metric.
#[derive(Debug, Clone)]
pub struct Patient {
    id: PatientId,
    readings: Vec<Reading>,
}

impl Patient {
    pub fn new(id: PatientId) -> Self {
        Self {
            id,
            readings: Vec::new(),
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    /// Appends a reading stamped with its arrival position.
    pub fn add_record(&mut self, value: f64, metric_type: MetricType, timestamp: i64) {
        let sequence = self.readings.len() as u64;
        self.readings
            .push(Reading::new(self.id, value, metric_type, timestamp).with_sequence(sequence));
    }

    /// Readings with `start <= timestamp <= end`, in arrival order.
    pub fn records_between(&self, start: i64, end: i64) -> Vec<Reading> {
        self.readings
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
