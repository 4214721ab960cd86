//! In-memory record storage for patient vital-sign readings.
//!
//! The default implementation ([`engine::MemoryRecordStore`]) keeps one
//! append-only reading sequence per patient, each behind its own lock, so
//! ingestion feeds writing different patients never contend and evaluation
//! reads never block writers of unrelated patients.

pub mod engine;
pub mod patient;


use cardiomon_common::types::{MetricType, PatientId, Reading};

pub use engine::MemoryRecordStore;
pub use patient::Patient;

/// Append-only storage of vital-sign readings with time-range queries.
///
/// Implementations must be safe to share across threads (`Send + Sync`)
/// because the store is written by ingestion tasks while the evaluation
/// loop reads it.
pub trait RecordStore: Send + Sync {
    /// Appends a reading for `patient_id`, creating the patient on first use.
    /// Duplicate submissions are stored as separate readings.
    fn add_record(&self, patient_id: PatientId, value: f64, metric_type: MetricType, timestamp: i64);

    /// Returns the patient's readings with `start <= timestamp <= end`, in
    /// arrival order. Unknown patients and empty ranges yield an empty vector.
    fn get_records(&self, patient_id: PatientId, start: i64, end: i64) -> Vec<Reading>;

    /// All patient ids that have at least one reading, ascending.
    fn patient_ids(&self) -> Vec<PatientId>;

    /// Total number of stored readings across all patients.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
