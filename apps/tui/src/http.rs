use std::time::Duration;

use prayer_core::{Transport, TransportError};
use reqwest::{Client, Response};
use serde_json::Value;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// [`Transport`] over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("prayer-times/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Failed(e.to_string()))?;
        read_json(response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Failed(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let message = status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_string);
        tracing::debug!(url = %response.url(), %status, "request rejected");
        return Err(TransportError::Status {
            code: status.as_u16(),
            message,
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| TransportError::Failed(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
}
