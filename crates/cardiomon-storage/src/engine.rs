use crate::patient::Patient;
use crate::RecordStore;
use cardiomon_common::types::{MetricType, PatientId, Reading};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory [`RecordStore`].
///
/// The outer map lock is held only long enough to look up (or insert) a
/// patient entry; appends and range queries then take that patient's own
/// lock. Poisoned locks are recovered; readings are append-only.
#[derive(Default)]
pub struct MemoryRecordStore {
    patients: RwLock<HashMap<PatientId, Arc<RwLock<Patient>>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn patient(&self, patient_id: PatientId) -> Option<Arc<RwLock<Patient>>> {
        let patients = self.patients.read().unwrap_or_else(PoisonError::into_inner);
        patients.get(&patient_id).cloned()
    }

    fn patient_or_insert(&self, patient_id: PatientId) -> Arc<RwLock<Patient>> {
        if let Some(existing) = self.patient(patient_id) {
            return existing;
        }
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        patients
            .entry(patient_id)
            .or_insert_with(|| {
                tracing::debug!(patient_id, "Registering new patient");
                Arc::new(RwLock::new(Patient::new(patient_id)))
            })
            .clone()
    }

    /// A point-in-time copy of one patient's full history.
    pub fn snapshot(&self, patient_id: PatientId) -> Option<Patient> {
        let entry = self.patient(patient_id)?;
        let patient = entry.read().unwrap_or_else(PoisonError::into_inner);
        Some(patient.clone())
    }
}

impl RecordStore for MemoryRecordStore {
    fn add_record(&self, patient_id: PatientId, value: f64, metric_type: MetricType, timestamp: i64) {
        let entry = self.patient_or_insert(patient_id);
        let mut patient = entry.write().unwrap_or_else(PoisonError::into_inner);
        patient.add_record(value, metric_type, timestamp);
    }

    fn get_records(&self, patient_id: PatientId, start: i64, end: i64) -> Vec<Reading> {
        let Some(entry) = self.patient(patient_id) else {
            return Vec::new();
        };
        let patient = entry.read().unwrap_or_else(PoisonError::into_inner);
        patient.records_between(start, end)
    }

    fn patient_ids(&self) -> Vec<PatientId> {
        let patients = self.patients.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<PatientId> = patients.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn len(&self) -> usize {
        let entries: Vec<Arc<RwLock<Patient>>> = {
            let patients = self.patients.read().unwrap_or_else(PoisonError::into_inner);
            patients.values().cloned().collect()
        };
        entries
            .iter()
            .map(|p| p.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }
}
