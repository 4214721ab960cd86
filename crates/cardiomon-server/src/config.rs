use cardiomon_alert::AlertConfig;
use cardiomon_ingest::BackoffPolicy;
use cardiomon_notify::routing::{default_priority_routes, PriorityRoute};
use cardiomon_notify::Priority;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Directory of `*.txt` reading files loaded once at startup.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// `host:port` of a newline-delimited reading feed.
    #[serde(default)]
    pub stream_endpoint: Option<String>,
    #[serde(default = "default_evaluation_interval_secs")]
    pub evaluation_interval_secs: u64,
    #[serde(default)]
    pub backoff: BackoffPolicy,
    /// First matching pattern sets an alert's priority.
    #[serde(default = "default_priority_routes")]
    pub priority_routes: Vec<PriorityRoute>,
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
    /// Repeat counts for a patient and condition are forgotten once no
    /// alert for them is newer than this.
    #[serde(default = "default_repeat_window_secs")]
    pub repeat_window_secs: u64,
    #[serde(default)]
    pub alert: AlertConfig,
}

/// One delivery channel, instantiated through the channel plugin registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub channel_type: String,
    #[serde(default = "default_min_priority")]
    pub min_priority: Priority,
    #[serde(default)]
    pub config: serde_json::Value,
}

fn default_evaluation_interval_secs() -> u64 {
    10
}

fn default_repeat_window_secs() -> u64 {
    24 * 60 * 60
}

fn default_min_priority() -> Priority {
    Priority::Low
}

fn default_channels() -> Vec<ChannelConfig> {
    vec![ChannelConfig {
        channel_type: "log".to_string(),
        min_priority: default_min_priority(),
        config: serde_json::Value::Null,
    }]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            stream_endpoint: None,
            evaluation_interval_secs: default_evaluation_interval_secs(),
            backoff: BackoffPolicy::default(),
            priority_routes: default_priority_routes(),
            channels: default_channels(),
            repeat_window_secs: default_repeat_window_secs(),
            alert: AlertConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.evaluation_interval_secs == 0 {
            anyhow::bail!("evaluation_interval_secs must be greater than 0");
        }
        if self.backoff.max_ms < self.backoff.initial_ms {
            anyhow::bail!("backoff.max_ms must not be smaller than backoff.initial_ms");
        }
        self.alert.validate()?;
        Ok(())
    }
}
