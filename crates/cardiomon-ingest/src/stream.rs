use crate::error::{IngestError, Result};
use crate::parser::parse_line;
use cardiomon_storage::RecordStore;
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, Duration};

/// Bounded exponential backoff for stream reconnects.
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffPolicy {
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
    /// Consecutive failures tolerated before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_ms() -> u64 {
    500
}

fn default_max_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    10
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retrying after the `failures`-th consecutive failure:
    /// `initial_ms * 2^(failures - 1)`, capped at `max_ms`.
    ///
    /// ```
    /// use cardiomon_ingest::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy { initial_ms: 100, max_ms: 1_000, max_attempts: 5 };
    /// assert_eq!(policy.delay(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay(3), Duration::from_millis(400));
    /// assert_eq!(policy.delay(10), Duration::from_millis(1_000));
    /// ```
    pub fn delay(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(32);
        let ms = self.initial_ms.saturating_mul(1u64 << shift).min(self.max_ms);
        Duration::from_millis(ms)
    }

    fn exhausted(&self, failures: u32) -> bool {
        failures >= self.max_attempts.max(1)
    }
}

/// Reads newline-delimited readings from a TCP feed into a record store.
pub struct StreamClient {
    endpoint: String,
    policy: BackoffPolicy,
    store: Arc<dyn RecordStore>,
}

impl StreamClient {
    pub fn new(endpoint: impl Into<String>, policy: BackoffPolicy, store: Arc<dyn RecordStore>) -> Self {
        Self {
            endpoint: endpoint.into(),
            policy,
            store,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Consumes the feed until the peer closes it, reconnecting on errors.
    ///
    /// Returns the number of readings stored. Fails with
    /// [`IngestError::RetriesExhausted`] once `max_attempts` consecutive
    /// connects or reads have failed; a successful connect resets the count.
    pub async fn run(&self) -> Result<usize> {
        let mut failures = 0u32;
        let mut stored = 0usize;

        loop {
            let outcome = match TcpStream::connect(&self.endpoint).await {
                Ok(stream) => {
                    failures = 0;
                    tracing::info!(endpoint = %self.endpoint, "Connected to data stream");
                    self.consume(stream, &mut stored).await
                }
                Err(e) => Err(IngestError::Io(e)),
            };

            match outcome {
                Ok(()) => {
                    tracing::info!(endpoint = %self.endpoint, stored, "Data stream closed by peer");
                    return Ok(stored);
                }
                Err(e) => {
                    failures += 1;
                    if self.policy.exhausted(failures) {
                        tracing::error!(endpoint = %self.endpoint, error = %e, failures, "Giving up on data stream");
                        return Err(IngestError::RetriesExhausted {
                            endpoint: self.endpoint.clone(),
                            attempts: failures,
                        });
                    }
                    let delay = self.policy.delay(failures);
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        error = %e,
                        failures,
                        retry_in_ms = delay.as_millis() as u64,
                        "Data stream failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Reads lines until EOF. Unparseable lines are skipped.
    async fn consume<R: AsyncRead + Unpin>(&self, reader: R, stored: &mut usize) -> Result<()> {
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(r) => {
                    self.store.add_record(r.patient_id, r.value, r.metric_type, r.timestamp);
                    *stored += 1;
                }
                Err(e) => tracing::warn!(endpoint = %self.endpoint, error = %e, "Skipping stream line"),
            }
        }
        Ok(())
    }
}
