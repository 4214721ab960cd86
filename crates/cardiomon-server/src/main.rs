use anyhow::Result;
use cardiomon_server::{Monitor, ServerConfig};
use chrono::Utc;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cardiomon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/server.toml".to_string());

    let config = ServerConfig::load(&config_path)?;
    tracing::info!(
        config = %config_path,
        trend_mode = %config.alert.trend_mode,
        "cardiomon-server starting"
    );

    let monitor = Monitor::from_config(&config)?;

    if let Some(dir) = &config.data_dir {
        monitor.load_dir(dir)?;
    }

    let stream_task = config.stream_endpoint.as_ref().map(|endpoint| {
        let client = monitor.stream_client(endpoint, config.backoff.clone());
        tokio::spawn(async move {
            match client.run().await {
                Ok(stored) => tracing::info!(endpoint = client.endpoint(), stored, "Stream ingestion finished"),
                Err(e) => tracing::error!(endpoint = client.endpoint(), error = %e, "Stream ingestion stopped"),
            }
        })
    });

    let mut tick = interval(Duration::from_secs(config.evaluation_interval_secs));
    tracing::info!(
        interval_secs = config.evaluation_interval_secs,
        "Starting evaluation loop"
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                monitor.tick(Utc::now().timestamp_millis());
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    if let Some(task) = stream_task {
        task.abort();
    }

    Ok(())
}
