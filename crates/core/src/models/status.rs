use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body returned by the system-status endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    /// Seconds since the server started.
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One snapshot of the "system status" panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub online: bool,
    pub checked_at: DateTime<Utc>,
    pub latency_ms: u64,
    /// 100 when the endpoint reports ok, 0 otherwise.
    pub api_health: f64,
    /// Share of the local storage quota in use.
    pub storage_used_pct: f64,
    /// Uptime relative to a 24h window, capped at 100.
    pub uptime_pct: f64,
    pub version: Option<String>,
}

impl SystemStatus {
    pub fn offline(checked_at: DateTime<Utc>, storage_used_pct: f64) -> Self {
        Self {
            online: false,
            checked_at,
            latency_ms: 0,
            api_health: 0.0,
            storage_used_pct,
            uptime_pct: 0.0,
            version: None,
        }
    }
}
