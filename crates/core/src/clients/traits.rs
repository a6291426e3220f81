use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::chat::ChatMessage;
use crate::models::status::StatusResponse;

/// Chat-completion backend for the assistant widget.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChatClient: Send + Sync {
    /// For logs and errors.
    fn name(&self) -> &str;

    /// Send the full conversation (system prompt first) and return the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CoreError>;
}

/// Source of the system-status panel's data.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StatusSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<StatusResponse, CoreError>;
}
