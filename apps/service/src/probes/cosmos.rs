use anyhow::{Context, Result};
use pulse::Probe;
use serde::Deserialize;
use serde_json::json;

use super::rpc::JsonRpcClient;

#[derive(Debug, Deserialize)]
struct Status {
    sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
struct SyncInfo {
    latest_block_height: String,
    #[serde(default)]
    catching_up: bool,
}

/// Latest height of a CometBFT node via the `status` RPC.
pub struct CometProbe {
    rpc: JsonRpcClient,
}

impl CometProbe {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait::async_trait]
impl Probe for CometProbe {
    async fn check(&self) -> Result<String> {
        let status: Status = self.rpc.call("status", json!({})).await?;
        let raw = status.sync_info.latest_block_height;
        let height: u64 =
            raw.parse().with_context(|| format!("latest_block_height `{raw}` is not a number"))?;

        if status.sync_info.catching_up {
            Ok(format!("block {height} (catching up)"))
        } else {
            Ok(format!("block {height}"))
        }
    }
}
