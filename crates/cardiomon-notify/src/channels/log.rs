use crate::decorator::DecoratedAlert;
use crate::plugin::ChannelPlugin;
use crate::NotificationChannel;
use anyhow::Result;
use serde_json::Value;

/// Emits each alert as a structured `tracing` event at WARN level.
pub struct LogChannel;

impl NotificationChannel for LogChannel {
    fn send(&self, alert: &DecoratedAlert) -> Result<()> {
        tracing::warn!(
            patient_id = %alert.alert.patient_id,
            timestamp = alert.alert.timestamp,
            priority = ?alert.priority,
            "{}",
            alert.description
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

pub struct LogPlugin;

impl ChannelPlugin for LogPlugin {
    fn name(&self) -> &str {
        "log"
    }

    fn validate_config(&self, _config: &Value) -> Result<()> {
        Ok(())
    }

    fn create_channel(&self, _config: &Value) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(LogChannel))
    }
}
