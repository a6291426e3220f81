use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient notification shown by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl Toast {
    /// Saturates at the latest representable instant for huge durations.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        let ms = i64::try_from(self.duration_ms).unwrap_or(i64::MAX);
        self.created_at
            .checked_add_signed(Duration::milliseconds(ms))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
