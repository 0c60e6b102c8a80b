//! Minimal JSON-RPC 2.0 client over HTTP POST.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl JsonRpcClient {
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Call `method` and decode its `result` member.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("{method} request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{method} failed with HTTP status {}", status.as_u16());
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("{method} returned an unreadable response"))?;

        match envelope {
            Envelope { error: Some(error), .. } => {
                bail!("{method} returned error {}: {}", error.code, error.message)
            }
            Envelope { result: Some(result), .. } => Ok(result),
            Envelope { result: None, error: None } => bail!("{method} returned no result"),
        }
    }
}
