use crate::decorator::DecoratedAlert;
use crate::plugin::ChannelPlugin;
use crate::NotificationChannel;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Appends each alert as one JSON line to a file, creating it on demand.
pub struct FileChannel {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NotificationChannel for FileChannel {
    fn send(&self, alert: &DecoratedAlert) -> Result<()> {
        let mut line = serde_json::to_string(alert)?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "file"
    }
}

#[derive(Deserialize)]
struct FileConfig {
    path: String,
}

pub struct FilePlugin;

impl ChannelPlugin for FilePlugin {
    fn name(&self) -> &str {
        "file"
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        let parsed: FileConfig = serde_json::from_value(config.clone())
            .context("file channel requires a 'path' string")?;
        if parsed.path.trim().is_empty() {
            anyhow::bail!("file channel 'path' must not be empty");
        }
        Ok(())
    }

    fn create_channel(&self, config: &Value) -> Result<Box<dyn NotificationChannel>> {
        self.validate_config(config)?;
        let parsed: FileConfig = serde_json::from_value(config.clone())?;
        Ok(Box::new(FileChannel::new(parsed.path)))
    }
}
