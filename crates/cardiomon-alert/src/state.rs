use crate::rules::trend::TrendDirection;
use cardiomon_common::types::{MetricType, PatientId, Reading};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Run-length accumulator for one patient and metric.
#[derive(Debug, Default, Clone)]
pub struct TrendAccumulator {
    /// Highest arrival sequence already consumed; readings at or below it are skipped.
    watermark: Option<u64>,
    previous: Option<f64>,
    direction: Option<TrendDirection>,
    run: u32,
}

impl TrendAccumulator {
    pub const RUN_LENGTH: u32 = 3;

    /// Feeds one reading. Returns the direction when the run reaches
    /// [`RUN_LENGTH`](Self::RUN_LENGTH); the counter then restarts from this reading.
    pub fn push(&mut self, value: f64, min_delta: f64) -> Option<TrendDirection> {
        let Some(previous) = self.previous.replace(value) else {
            self.run = 1;
            return None;
        };

        let step = if value - previous > min_delta {
            Some(TrendDirection::Increasing)
        } else if previous - value > min_delta {
            Some(TrendDirection::Decreasing)
        } else {
            None
        };

        match step {
            None => {
                self.direction = None;
                self.run = 1;
            }
            Some(dir) if self.direction == Some(dir) => self.run += 1,
            Some(dir) => {
                self.direction = Some(dir);
                self.run = 2;
            }
        }

        if self.run >= Self::RUN_LENGTH {
            self.run = 1;
            return self.direction.take();
        }
        None
    }

    pub fn run(&self) -> u32 {
        self.run
    }
}

/// Engine-owned map of trend accumulators keyed by `(patient, metric)`.
///
/// The whole advance for one key happens under the lock, so overlapping
/// evaluations of the same patient cannot double-count a reading.
#[derive(Debug, Default)]
pub struct TrendStates {
    inner: Mutex<HashMap<(PatientId, MetricType), TrendAccumulator>>,
}

impl TrendStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes readings that arrived after the key's watermark, in arrival
    /// order, and returns each completed run with the timestamp of the reading that
    /// completed it.
    pub fn advance(
        &self,
        patient_id: PatientId,
        metric: MetricType,
        readings: &[&Reading],
        min_delta: f64,
    ) -> Vec<(TrendDirection, i64)> {
        let mut states = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let acc = states.entry((patient_id, metric)).or_default();

        let mut completed = Vec::new();
        for reading in readings {
            if acc.watermark.is_some_and(|mark| reading.sequence <= mark) {
                continue;
            }
            acc.watermark = Some(reading.sequence);
            if let Some(direction) = acc.push(reading.value, min_delta) {
                completed.push((direction, reading.timestamp));
            }
        }
        completed
    }

    pub fn get(&self, patient_id: PatientId, metric: MetricType) -> Option<TrendAccumulator> {
        let states = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        states.get(&(patient_id, metric)).cloned()
    }

    pub fn reset_patient(&self, patient_id: PatientId) {
        let mut states = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        states.retain(|(id, _), _| *id != patient_id);
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
