use chrono::{DateTime, Utc};

use crate::models::toast::{Toast, ToastKind};

/// Queue of transient toasts. Each expires `duration_ms` after it was pushed.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    toasts: Vec<Toast>,
    next_id: u64,
    duration_ms: u64,
}

impl NotificationCenter {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            toasts: Vec::new(),
            next_id: 1,
            duration_ms,
        }
    }

    /// Returns the toast id.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            created_at: now,
            duration_ms: self.duration_ms,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message, Utc::now())
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message, Utc::now())
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message, Utc::now())
    }

    /// Drop expired toasts and return the rest, oldest first.
    pub fn active(&mut self, now: DateTime<Utc>) -> &[Toast] {
        self.toasts.retain(|t| !t.is_expired(now));
        &self.toasts
    }

    /// Everything queued, expired or not.
    #[must_use]
    pub fn all(&self) -> &[Toast] {
        &self.toasts
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(3000)
    }
}
