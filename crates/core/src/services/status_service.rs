use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clients::traits::StatusSource;
use crate::models::status::{StatusResponse, SystemStatus};
use crate::storage::store::STORAGE_QUOTA_BYTES;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Builds the system-status panel from the status endpoint and the
/// store's footprint.
pub struct StatusService {
    source: Arc<dyn StatusSource>,
}

impl StatusService {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> Arc<dyn StatusSource> {
        Arc::clone(&self.source)
    }

    /// One poll. Errors turn into an offline snapshot.
    pub async fn check(&self, storage_bytes: usize) -> SystemStatus {
        probe(self.source.as_ref(), storage_bytes).await
    }

    /// Pure mapping from an endpoint answer to panel figures.
    #[must_use]
    pub fn derive(
        response: &StatusResponse,
        latency_ms: u64,
        storage_bytes: usize,
        checked_at: DateTime<Utc>,
    ) -> SystemStatus {
        let healthy = matches!(
            response.status.to_lowercase().as_str(),
            "ok" | "online" | "healthy" | "up"
        );
        let uptime_pct = match response.uptime {
            Some(secs) if secs > 0.0 => (secs / SECONDS_PER_DAY * 100.0).min(100.0),
            Some(_) => 0.0,
            None if healthy => 100.0,
            None => 0.0,
        };
        SystemStatus {
            online: true,
            checked_at,
            latency_ms,
            api_health: if healthy { 100.0 } else { 0.0 },
            storage_used_pct: storage_pct(storage_bytes),
            uptime_pct,
            version: response.version.clone(),
        }
    }
}

pub async fn probe(source: &dyn StatusSource, storage_bytes: usize) -> SystemStatus {
    let started = Utc::now();
    match source.fetch().await {
        Ok(response) => {
            let finished = Utc::now();
            let latency_ms = (finished - started).num_milliseconds().max(0) as u64;
            debug!(source = source.name(), latency_ms, "status polled");
            StatusService::derive(&response, latency_ms, storage_bytes, finished)
        }
        Err(e) => {
            warn!(source = source.name(), error = %e, "status poll failed");
            SystemStatus::offline(Utc::now(), storage_pct(storage_bytes))
        }
    }
}

/// Percentage of the `localStorage` quota, capped at 100.
#[must_use]
pub fn storage_pct(bytes: usize) -> f64 {
    (bytes as f64 / STORAGE_QUOTA_BYTES as f64 * 100.0).min(100.0)
}

/// Shared byte count of the store, updated by the facade after each write.
#[derive(Debug, Clone, Default)]
pub struct StorageGauge(Arc<AtomicUsize>);

impl StorageGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, bytes: usize) {
        self.0.store(bytes, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Background poller publishing every snapshot on a watch channel.
/// Polling stops when the monitor is dropped or every receiver is gone.
#[cfg(not(target_arch = "wasm32"))]
pub struct StatusMonitor {
    receiver: tokio::sync::watch::Receiver<Option<SystemStatus>>,
    handle: tokio::task::JoinHandle<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl StatusMonitor {
    /// Must be called inside a Tokio runtime. The first poll runs immediately.
    pub fn spawn(
        source: Arc<dyn StatusSource>,
        every: std::time::Duration,
        gauge: StorageGauge,
    ) -> Self {
        let (sender, receiver) = tokio::sync::watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let status = probe(source.as_ref(), gauge.get()).await;
                if sender.send(Some(status)).is_err() {
                    break;
                }
            }
        });
        Self { receiver, handle }
    }

    #[must_use]
    pub fn latest(&self) -> Option<SystemStatus> {
        self.receiver.borrow().clone()
    }

    /// A receiver for UIs that want to await changes themselves.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Option<SystemStatus>> {
        self.receiver.clone()
    }

    /// Wait for the next snapshot. `None` if the poller has stopped.
    pub async fn next(&mut self) -> Option<SystemStatus> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
