use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use pulse::{Probe, pick_sample};
use serde::Deserialize;
use serde_json::json;
use url::Url;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<GmpRecord>,
}

#[derive(Debug, Deserialize)]
struct GmpRecord {
    status: Option<String>,
}

/// Cross-chain status of a random known transaction, looked up on the Axelar
/// GMP API.
///
/// The hash is drawn from `tx_file` on every check, so edits to the file apply
/// to the next cycle. An unreadable or empty file fails only this probe.
pub struct AxelarProbe {
    http: reqwest::Client,
    api: Url,
    tx_file: PathBuf,
}

impl AxelarProbe {
    pub fn new(http: reqwest::Client, api: Url, tx_file: PathBuf) -> Self {
        Self { http, api, tx_file }
    }
}

#[async_trait::async_trait]
impl Probe for AxelarProbe {
    async fn check(&self) -> Result<String> {
        let tx_hash = pick_sample(&self.tx_file).await?;

        let response = self
            .http
            .post(self.api.clone())
            .json(&json!({ "method": "searchGMP", "txHash": tx_hash }))
            .send()
            .await
            .context("searchGMP request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("searchGMP failed with HTTP status {}", status.as_u16());
        }

        let found: SearchResponse =
            response.json().await.context("searchGMP returned an unreadable response")?;
        let gmp_status =
            found.data.first().and_then(|record| record.status.as_deref()).unwrap_or("not_found");

        Ok(format!("tx {tx_hash} status {gmp_status}"))
    }
}
