use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Runtime configuration for the dashboard core.
///
/// Not part of the key/value store; the host builds it from defaults, a
/// JSON file, or the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Admin login name.
    pub admin_username: String,

    /// Argon2 PHC string of the admin password. Empty disables admin login.
    pub admin_password_hash: String,

    /// GET endpoint polled by the status panel.
    pub status_endpoint: String,

    /// Seconds between two status polls.
    pub status_poll_secs: u64,

    /// POST endpoint for chat completions.
    pub chat_endpoint: String,

    pub chat_api_key: Option<String>,

    pub chat_model: String,

    /// How long a toast stays visible.
    pub toast_duration_ms: u64,

    /// Currency symbol used by exports and chat replies.
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password_hash: String::new(),
            status_endpoint: "http://localhost:3000/api/status".to_string(),
            status_poll_secs: 30,
            chat_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            chat_api_key: None,
            chat_model: "gpt-3.5-turbo".to_string(),
            toast_duration_ms: 3000,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Deserialization(format!("Invalid settings JSON: {e}")))
    }

    /// Defaults overridden by `JDSA_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, `.env` map, ...).
    /// Unparseable numbers are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("JDSA_ADMIN_USERNAME") {
            self.admin_username = v;
        }
        if let Some(v) = lookup("JDSA_ADMIN_PASSWORD_HASH") {
            self.admin_password_hash = v;
        }
        if let Some(v) = lookup("JDSA_STATUS_URL") {
            self.status_endpoint = v;
        }
        if let Some(v) = lookup("JDSA_POLL_SECS").and_then(|v| v.parse().ok()) {
            self.status_poll_secs = v;
        }
        if let Some(v) = lookup("JDSA_CHAT_URL") {
            self.chat_endpoint = v;
        }
        if let Some(v) = lookup("JDSA_CHAT_API_KEY") {
            self.chat_api_key = Some(v);
        }
        if let Some(v) = lookup("JDSA_CHAT_MODEL") {
            self.chat_model = v;
        }
        if let Some(v) = lookup("JDSA_TOAST_MS").and_then(|v| v.parse().ok()) {
            self.toast_duration_ms = v;
        }
        self
    }
}
