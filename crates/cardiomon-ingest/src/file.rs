use crate::error::{IngestError, Result};
use crate::parser::parse_line;
use cardiomon_storage::RecordStore;
use std::path::{Path, PathBuf};

/// Outcome of loading a data directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadSummary {
    /// Files that were opened and read.
    pub files: usize,
    /// Readings appended to the store.
    pub stored: usize,
    /// Non-blank lines that did not parse into a reading.
    pub skipped: usize,
}

/// Loads every `*.txt` file of a directory into a record store.
pub struct FileDataReader {
    dir: PathBuf,
}

impl FileDataReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads the files in name order. Unreadable files and unparseable lines
    /// are logged and skipped.
    pub fn read_into(&self, store: &dyn RecordStore) -> Result<ReadSummary> {
        if !self.dir.is_dir() {
            return Err(IngestError::NotADirectory(self.dir.clone()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut summary = ReadSummary::default();
        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable data file");
                    continue;
                }
            };
            summary.files += 1;

            for (index, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(line) {
                    Ok(r) => {
                        store.add_record(r.patient_id, r.value, r.metric_type, r.timestamp);
                        summary.stored += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            line = index + 1,
                            error = %e,
                            "Skipping data line"
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            dir = %self.dir.display(),
            files = summary.files,
            stored = summary.stored,
            skipped = summary.skipped,
            "Loaded data directory"
        );
        Ok(summary)
    }
}
