use async_trait::async_trait;
use reqwest::Client;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::StatusSource;
use crate::errors::CoreError;
use crate::models::status::StatusResponse;

/// GETs a JSON status document such as `{"status":"ok","uptime":1234.5}`.
pub struct HttpStatusSource {
    client: Client,
    endpoint: String,
}

impl HttpStatusSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(10));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.into(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StatusSource for HttpStatusSource {
    fn name(&self) -> &str {
        "status-endpoint"
    }

    async fn fetch(&self) -> Result<StatusResponse, CoreError> {
        let resp = self.client.get(&self.endpoint).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                service: self.name().into(),
                message: format!("HTTP {status}"),
            });
        }
        resp.json().await.map_err(|e| CoreError::Api {
            service: self.name().into(),
            message: format!("Failed to parse status: {e}"),
        })
    }
}
