//! Reading ingestion from data files and live line-oriented streams.
//!
//! Both sources share one line format:
//!
//! ```text
//! Patient ID: 7, Timestamp: 1700000000000, Label: Saturation, Data: 94.0%
//! ```
//!
//! Parsed readings are appended to a [`cardiomon_storage::RecordStore`].

pub mod error;
pub mod file;
pub mod parser;
pub mod stream;


pub use error::IngestError;
pub use file::{FileDataReader, ReadSummary};
pub use parser::parse_line;
pub use stream::{BackoffPolicy, StreamClient};
