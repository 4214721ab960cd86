use std::path::PathBuf;

/// Errors raised while reading or parsing vital-sign input.
///
/// # Examples
///
/// ```rust
/// use cardiomon_ingest::IngestError;
///
/// let err = IngestError::UnknownLabel("Alert".to_string());
/// assert!(err.to_string().contains("Alert"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Ingest: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line that does not follow the `Key: value, ...` record format.
    #[error("Ingest: malformed line {line:?}: {reason}")]
    Malformed { line: String, reason: String },

    /// A well-formed line whose label is not a known metric type.
    #[error("Ingest: unknown label {0:?}")]
    UnknownLabel(String),

    #[error("Ingest: {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The stream could not be (re)established within the backoff policy.
    #[error("Ingest: gave up on {endpoint} after {attempts} consecutive failures")]
    RetriesExhausted { endpoint: String, attempts: u32 },
}

pub type Result<T> = std::result::Result<T, IngestError>;
