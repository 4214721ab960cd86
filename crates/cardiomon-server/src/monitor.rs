use crate::config::ServerConfig;
use cardiomon_alert::{AlertConfig, AlertEngine};
use cardiomon_common::sink::AlertSink;
use cardiomon_common::types::Alert;
use cardiomon_ingest::{BackoffPolicy, FileDataReader, ReadSummary, StreamClient};
use cardiomon_notify::plugin::ChannelRegistry;
use cardiomon_notify::routing::ChannelRoute;
use cardiomon_notify::NotificationManager;
use cardiomon_storage::{MemoryRecordStore, RecordStore};
use std::sync::Arc;

/// Notification manager whose repeat counters expire after `window_ms`.
struct RepeatExpiry {
    notifier: Arc<NotificationManager>,
    window_ms: i64,
}

/// A record store plus the evaluation engine reading from it.
pub struct Monitor {
    store: Arc<dyn RecordStore>,
    engine: AlertEngine,
    repeats: Option<RepeatExpiry>,
}

impl Monitor {
    pub fn new(store: Arc<dyn RecordStore>, config: AlertConfig, sink: Arc<dyn AlertSink>) -> Self {
        let engine = AlertEngine::with_default_rules(Arc::clone(&store), config, sink);
        Self {
            store,
            engine,
            repeats: None,
        }
    }

    /// Builds an in-memory monitor delivering through the configured channels.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let notifier = Arc::new(build_notifier(config, &ChannelRegistry::default())?);
        let mut monitor = Self::new(
            Arc::new(MemoryRecordStore::new()),
            config.alert.clone(),
            notifier.clone(),
        );
        monitor.repeats = Some(RepeatExpiry {
            notifier,
            window_ms: i64::try_from(config.repeat_window_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
        });
        Ok(monitor)
    }

    pub fn notifier(&self) -> Option<&NotificationManager> {
        self.repeats.as_ref().map(|r| r.notifier.as_ref())
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    pub fn load_dir(&self, dir: &str) -> anyhow::Result<ReadSummary> {
        Ok(FileDataReader::new(dir).read_into(self.store.as_ref())?)
    }

    pub fn stream_client(&self, endpoint: &str, policy: BackoffPolicy) -> StreamClient {
        StreamClient::new(endpoint, policy, Arc::clone(&self.store))
    }

    /// One evaluation pass over every known patient as of `now_ms`.
    pub fn tick(&self, now_ms: i64) -> Vec<Alert> {
        let alerts = self.engine.evaluate_all(now_ms);
        if let Some(repeats) = &self.repeats {
            let evicted = repeats.notifier.evict_stale(now_ms.saturating_sub(repeats.window_ms));
            if evicted > 0 {
                tracing::debug!(evicted, "Expired repeat counters");
            }
        }
        tracing::info!(
            patients = self.store.patient_ids().len(),
            readings = self.store.len(),
            alerts = alerts.len(),
            "Evaluation pass complete"
        );
        alerts
    }
}

/// Instantiates each configured channel and routes it at its minimum priority.
pub fn build_notifier(config: &ServerConfig, registry: &ChannelRegistry) -> anyhow::Result<NotificationManager> {
    let mut channels = Vec::with_capacity(config.channels.len());
    let mut routes = Vec::with_capacity(config.channels.len());
    for (channel_index, channel) in config.channels.iter().enumerate() {
        let created = registry
            .create_channel(&channel.channel_type, &channel.config)
            .map_err(|e| anyhow::anyhow!("channel #{channel_index} ({}): {e}", channel.channel_type))?;
        tracing::info!(
            channel = created.channel_name(),
            min_priority = %channel.min_priority,
            "Notification channel configured"
        );
        channels.push(created);
        routes.push(ChannelRoute {
            min_priority: channel.min_priority,
            channel_index,
        });
    }
    Ok(NotificationManager::new(channels, routes, config.priority_routes.clone()))
}
