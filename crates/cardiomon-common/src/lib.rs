//! Shared domain types for the cardiomon workspace: vital-sign readings,
//! metric types, the alert value produced by rule evaluation and the sink
//! contract alerts are delivered through.

pub mod sink;
pub mod types;
