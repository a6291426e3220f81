use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::ChatClient;
use crate::errors::CoreError;
use crate::models::chat::ChatMessage;
use crate::models::settings::Settings;

/// OpenAI-compatible `/chat/completions` client.
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.chat_endpoint.clone(),
            settings.chat_api_key.clone(),
            settings.chat_model.clone(),
        )
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChatClient for HttpChatClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CoreError> {
        let mut request = self.client.post(&self.endpoint).json(&CompletionRequest {
            model: &self.model,
            messages,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                service: self.name().into(),
                message: format!("HTTP {status}"),
            });
        }

        let body: CompletionResponse = resp.json().await.map_err(|e| CoreError::Api {
            service: self.name().into(),
            message: format!("Failed to parse completion: {e}"),
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CoreError::Api {
                service: self.name().into(),
                message: "Completion contained no choices".into(),
            })
    }
}
